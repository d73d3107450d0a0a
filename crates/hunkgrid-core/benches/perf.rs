//! Build and expansion benchmarks for large files

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use hunkgrid_core::{
    Change, DiffFile, DisplayMode, Hunk, HunkDirection, HunkList, LoadResult, PlainHighlighter,
};

const HUNK_SPACING: u32 = 60;

fn source_line(n: u32) -> String {
    format!("    let value_{} = compute({}, \"{}\");", n, n * 3, n)
}

/// File of `lines` lines with a one-line modification every `HUNK_SPACING` lines
fn synthetic_file(lines: u32) -> DiffFile {
    let mut hunks = Vec::new();
    let mut start = 10;
    while start + 6 < lines {
        let mut changes = Vec::new();
        for n in start..start + 3 {
            changes.push(Change::context(source_line(n), n, n));
        }
        changes.push(Change::delete(source_line(start + 3), start + 3));
        changes.push(Change::add(format!("{} // edited", source_line(start + 3)), start + 3));
        for n in start + 4..start + 7 {
            changes.push(Change::context(source_line(n), n, n));
        }
        hunks.push(Hunk {
            old_start: start,
            old_lines: 7,
            new_start: start,
            new_lines: 7,
            changes,
        });
        start += HUNK_SPACING;
    }
    DiffFile::new("bench.rs", hunks).with_line_counts(lines, lines)
}

fn fetch(list: &HunkList, line: &hunkgrid_core::LinePair, direction: HunkDirection) -> LoadResult {
    let mut result = LoadResult::default();
    if let Ok(range) = list.get_load_range(line, direction) {
        for n in range.left_range.start..=range.left_range.end {
            result.left_lines.insert(n, source_line(n));
        }
        for n in range.right_range.start..=range.right_range.end {
            result.right_lines.insert(n, source_line(n));
        }
    }
    result
}

/// Expand every gap one page from the top until nothing is left
fn expand_all(mut list: HunkList) -> HunkList {
    loop {
        let Some(row) = list.hunk_rows().next().cloned() else {
            return list;
        };
        let direction = match row.hunk_direction {
            Some(HunkDirection::In) => HunkDirection::InDown,
            Some(direction) => direction,
            None => return list,
        };
        let result = fetch(&list, &row, direction);
        match list.load_lines(&row, &result, direction, &PlainHighlighter) {
            Ok(next) => list = next,
            Err(_) => return list,
        }
    }
}

fn benchmark_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build");
    for lines in [1_000u32, 10_000, 50_000] {
        let file = synthetic_file(lines);
        for mode in [DisplayMode::Split, DisplayMode::Unified] {
            group.bench_with_input(
                BenchmarkId::new(format!("{:?}", mode), lines),
                &file,
                |b, file| b.iter(|| HunkList::build(black_box(file), mode, 20, &PlainHighlighter)),
            );
        }
    }
    group.finish();
}

fn benchmark_expand(c: &mut Criterion) {
    let mut group = c.benchmark_group("expand_all");
    group.sample_size(10);
    for lines in [1_000u32, 5_000] {
        let list = HunkList::build(&synthetic_file(lines), DisplayMode::Split, 20, &PlainHighlighter);
        group.bench_with_input(BenchmarkId::from_parameter(lines), &list, |b, list| {
            b.iter(|| expand_all(black_box(list.clone())))
        });
    }
    group.finish();
}

criterion_group!(benches, benchmark_build, benchmark_expand);
criterion_main!(benches);
