// benches/extract.rs
use criterion::{Criterion, black_box, criterion_group, criterion_main};

use sei_capture::capture::{extract_page, extract_rows};
use sei_capture::driver::snapshot::SnapshotBrowser;

fn rows(n: usize) -> Vec<Vec<String>> {
    (0..n)
        .map(|i| {
            vec![
                String::new(),
                format!(" 1000.{i:06}/2024-01 "),
                format!("tecnico{}@example.org", i % 9),
            ]
        })
        .collect()
}

fn page(n: usize) -> String {
    let mut html = String::from(r#"<html><body><table id="tblProcessosDetalhado"><tbody>"#);
    for i in 0..n {
        html.push_str(&format!(
            r#"<tr><td><a href="javascript:void(0)"><img></a></td><td><a href="p{i}">1000.{i:06}/2024-01</a></td><td><a href="javascript:void(0)">tecnico{}@example.org</a></td></tr>"#,
            i % 9
        ));
    }
    html.push_str("</tbody></table></body></html>");
    html
}

fn bench_extract(c: &mut Criterion) {
    let input = rows(500);
    c.bench_function("extract_rows_500", |b| {
        b.iter(|| extract_rows(black_box(input.clone())))
    });

    let html = page(100);
    c.bench_function("extract_page_snapshot_100", |b| {
        b.iter(|| {
            let mut browser = SnapshotBrowser::from_pages([html.as_str()]);
            extract_page(black_box(&mut browser)).map(|v| v.len()).unwrap_or(0)
        })
    });
}

criterion_group!(benches, bench_extract);
criterion_main!(benches);
