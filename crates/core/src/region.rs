//! Canonical regions and name normalization.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

lazy_static! {
    // "(계)", "[주]", trailing "1)", "*", "※"
    static ref REGION_NOTES: Regex = Regex::new(r"\([^)]*\)|\[[^\]]*\]|\d+\)$|[*※†]+").unwrap();
}

/// The nation plus the 17 first-level administrative divisions.
///
/// Declaration order is the canonical reporting order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Region {
    #[serde(rename = "전국")]
    Nation,
    #[serde(rename = "서울")]
    Seoul,
    #[serde(rename = "부산")]
    Busan,
    #[serde(rename = "대구")]
    Daegu,
    #[serde(rename = "인천")]
    Incheon,
    #[serde(rename = "광주")]
    Gwangju,
    #[serde(rename = "대전")]
    Daejeon,
    #[serde(rename = "울산")]
    Ulsan,
    #[serde(rename = "세종")]
    Sejong,
    #[serde(rename = "경기")]
    Gyeonggi,
    #[serde(rename = "강원")]
    Gangwon,
    #[serde(rename = "충북")]
    Chungbuk,
    #[serde(rename = "충남")]
    Chungnam,
    #[serde(rename = "전북")]
    Jeonbuk,
    #[serde(rename = "전남")]
    Jeonnam,
    #[serde(rename = "경북")]
    Gyeongbuk,
    #[serde(rename = "경남")]
    Gyeongnam,
    #[serde(rename = "제주")]
    Jeju,
}

impl Region {
    /// Every region in canonical order, nation first.
    pub const ALL: [Region; 18] = [
        Region::Nation,
        Region::Seoul,
        Region::Busan,
        Region::Daegu,
        Region::Incheon,
        Region::Gwangju,
        Region::Daejeon,
        Region::Ulsan,
        Region::Sejong,
        Region::Gyeonggi,
        Region::Gangwon,
        Region::Chungbuk,
        Region::Chungnam,
        Region::Jeonbuk,
        Region::Jeonnam,
        Region::Gyeongbuk,
        Region::Gyeongnam,
        Region::Jeju,
    ];

    /// Normalize a region cell to its canonical region.
    ///
    /// Accepts formal names (`서울특별시`), abbreviations (`서울`), spaced
    /// variants (`서 울`), footnoted variants (`세종1)`) and English names.
    /// Anything else is `None`; callers skip such rows rather than reading
    /// them as the nation.
    #[must_use]
    pub fn normalize(raw: &str) -> Option<Region> {
        let compact: String = raw
            .chars()
            .filter(|c| !c.is_whitespace() && !matches!(c, '-' | '_' | '.' | '·'))
            .collect();
        let cleaned = REGION_NOTES.replace_all(&compact, "").to_lowercase();
        lookup(&cleaned)
    }

    /// Canonical short form (`서울`)
    #[must_use]
    pub fn short_name(self) -> &'static str {
        match self {
            Region::Nation => "전국",
            Region::Seoul => "서울",
            Region::Busan => "부산",
            Region::Daegu => "대구",
            Region::Incheon => "인천",
            Region::Gwangju => "광주",
            Region::Daejeon => "대전",
            Region::Ulsan => "울산",
            Region::Sejong => "세종",
            Region::Gyeonggi => "경기",
            Region::Gangwon => "강원",
            Region::Chungbuk => "충북",
            Region::Chungnam => "충남",
            Region::Jeonbuk => "전북",
            Region::Jeonnam => "전남",
            Region::Gyeongbuk => "경북",
            Region::Gyeongnam => "경남",
            Region::Jeju => "제주",
        }
    }

    /// Current formal administrative name (`서울특별시`)
    #[must_use]
    pub fn formal_name(self) -> &'static str {
        match self {
            Region::Nation => "전국",
            Region::Seoul => "서울특별시",
            Region::Busan => "부산광역시",
            Region::Daegu => "대구광역시",
            Region::Incheon => "인천광역시",
            Region::Gwangju => "광주광역시",
            Region::Daejeon => "대전광역시",
            Region::Ulsan => "울산광역시",
            Region::Sejong => "세종특별자치시",
            Region::Gyeonggi => "경기도",
            Region::Gangwon => "강원특별자치도",
            Region::Chungbuk => "충청북도",
            Region::Chungnam => "충청남도",
            Region::Jeonbuk => "전북특별자치도",
            Region::Jeonnam => "전라남도",
            Region::Gyeongbuk => "경상북도",
            Region::Gyeongnam => "경상남도",
            Region::Jeju => "제주특별자치도",
        }
    }

    #[must_use]
    pub fn is_nation(self) -> bool {
        self == Region::Nation
    }
}

fn lookup(name: &str) -> Option<Region> {
    let region = match name {
        "전국" | "전국계" | "전국합계" | "wholecountry" | "nationwide" | "national" | "korea" => {
            Region::Nation
        }
        "서울" | "서울시" | "서울특별시" | "seoul" => Region::Seoul,
        "부산" | "부산시" | "부산광역시" | "busan" | "pusan" => Region::Busan,
        "대구" | "대구시" | "대구광역시" | "daegu" | "taegu" => Region::Daegu,
        "인천" | "인천시" | "인천광역시" | "incheon" => Region::Incheon,
        "광주" | "광주광역시" | "gwangju" | "kwangju" => Region::Gwangju,
        "대전" | "대전시" | "대전광역시" | "daejeon" => Region::Daejeon,
        "울산" | "울산시" | "울산광역시" | "ulsan" => Region::Ulsan,
        "세종" | "세종시" | "세종특별자치시" | "sejong" => Region::Sejong,
        "경기" | "경기도" | "gyeonggi" | "gyeonggido" | "kyonggi" => Region::Gyeonggi,
        "강원" | "강원도" | "강원특별자치도" | "gangwon" | "gangwondo" | "kangwon" => {
            Region::Gangwon
        }
        "충북" | "충청북도" | "chungbuk" | "chungcheongbukdo" | "northchungcheong" => {
            Region::Chungbuk
        }
        "충남" | "충청남도" | "chungnam" | "chungcheongnamdo" | "southchungcheong" => {
            Region::Chungnam
        }
        "전북" | "전라북도" | "전북특별자치도" | "jeonbuk" | "jeollabukdo" | "northjeolla" => {
            Region::Jeonbuk
        }
        "전남" | "전라남도" | "jeonnam" | "jeollanamdo" | "southjeolla" => Region::Jeonnam,
        "경북" | "경상북도" | "gyeongbuk" | "gyeongsangbukdo" | "northgyeongsang" => {
            Region::Gyeongbuk
        }
        "경남" | "경상남도" | "gyeongnam" | "gyeongsangnamdo" | "southgyeongsang" => {
            Region::Gyeongnam
        }
        "제주" | "제주도" | "제주특별자치도" | "jeju" | "jejudo" => Region::Jeju,
        _ => return None,
    };
    Some(region)
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

impl FromStr for Region {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Region::normalize(s).ok_or_else(|| format!("unrecognized region: '{s}'"))
    }
}

impl<'de> Deserialize<'de> for Region {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
