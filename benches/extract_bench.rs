use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use regstat_core::{
    CellValue, ClassificationFilter, EngineConfig, Extractor, GroupDefinition, PeriodIndex,
    PeriodKey, Region, RowLocator, SheetTable, WorkbookCache, YearQuarter,
};
use rust_xlsxwriter::Workbook;
use std::sync::Arc;

const QUARTERS: [&str; 8] = [
    "2023.3/4", "2023.4/4", "2024.1/4", "2024.2/4", "2024.3/4", "2024.4/4", "2025.1/4", "2025.2/4p",
];

/// Header row plus `classes` rows per region, classification code in column 1.
fn sample_rows(classes: usize) -> Vec<Vec<CellValue>> {
    let mut header = vec![CellValue::from("시도"), CellValue::from("구분")];
    header.extend(QUARTERS.iter().map(|q| CellValue::from(*q)));

    let mut rows = vec![header];
    for (r, region) in Region::ALL.iter().enumerate() {
        for class in 0..classes {
            let mut row = vec![CellValue::from(region.formal_name()), CellValue::Int(class as i64)];
            row.extend((0..QUARTERS.len()).map(|q| CellValue::Float(50.0 + r as f64 + q as f64 * 0.3)));
            rows.push(row);
        }
    }
    rows
}

fn bench_region_normalize(c: &mut Criterion) {
    let mut group = c.benchmark_group("region");

    group.bench_function("short", |b| b.iter(|| Region::normalize(black_box("서울"))));
    group.bench_function("formal", |b| {
        b.iter(|| Region::normalize(black_box("전북특별자치도")))
    });
    group.bench_function("footnoted", |b| b.iter(|| Region::normalize(black_box("세 종 1)"))));
    group.bench_function("unknown", |b| b.iter(|| Region::normalize(black_box("주: 잠정치"))));

    group.finish();
}

fn bench_header_parse(c: &mut Criterion) {
    let table = SheetTable::from_rows("고용률", sample_rows(1));

    c.bench_function("parse_header", |b| {
        b.iter(|| PeriodIndex::parse_header(black_box(&table), 0))
    });
}

fn bench_locate(c: &mut Criterion) {
    let mut group = c.benchmark_group("locate_all");
    let filter = ClassificationFilter::code("0").unwrap();
    let locator = RowLocator::new(0, 1).with_classification_column(1);

    for classes in [1, 10, 100].iter() {
        let table = SheetTable::from_rows("고용률", sample_rows(*classes));
        group.bench_with_input(BenchmarkId::new("classes", classes), classes, |b, _| {
            b.iter(|| locator.locate_all(black_box(&table), black_box(&filter)))
        });
    }

    group.finish();
}

fn bench_cached_extract(c: &mut Criterion) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("raw.xlsx");

    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name("고용률(시도)").unwrap();
    for (r, row) in sample_rows(5).iter().enumerate() {
        for (col, cell) in row.iter().enumerate() {
            match cell {
                CellValue::Float(f) => sheet.write_number(r as u32, col as u16, *f),
                CellValue::Int(i) => sheet.write_number(r as u32, col as u16, *i as f64),
                other => sheet.write_string(r as u32, col as u16, other.as_str()),
            }
            .unwrap();
        }
    }
    workbook.save(&path).unwrap();

    let config = EngineConfig::from_yaml_str(
        "indicators:\n  employment_rate:\n    sheet: 고용률\n    header_row: 0\n    classification_column: 1\n    classification: 0\n    metric: difference\n",
    )
    .unwrap();
    let period = PeriodKey::Quarter(YearQuarter { year: 2025, quarter: 2 });
    let request = config.request(&path, "employment_rate", period).unwrap();
    let extractor = Extractor::new(Arc::new(WorkbookCache::new()));
    let groups = GroupDefinition::default();

    c.bench_function("extract_cached", |b| {
        b.iter(|| {
            let extraction = extractor.extract(black_box(&request)).unwrap();
            extraction.report(&groups, 3)
        })
    });
}

criterion_group!(
    benches,
    bench_region_normalize,
    bench_header_parse,
    bench_locate,
    bench_cached_extract
);
criterion_main!(benches);
