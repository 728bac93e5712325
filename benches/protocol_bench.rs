//! Benchmarks for hftp request framing and parsing

use std::io::Cursor;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use hftp::protocol::{write_base64, Command, LineReader};

fn parse_benchmarks(c: &mut Criterion) {
    c.bench_function("parse_get_slice", |b| {
        b.iter(|| Command::parse(black_box("get_slice some-file.bin 1048576 65536")))
    });

    c.bench_function("parse_unknown_verb", |b| {
        b.iter(|| Command::parse(black_box("bogus_verb a b c")))
    });
}

fn framing_benchmarks(c: &mut Criterion) {
    let input = "get_metadata a.txt\r\n".repeat(1000).into_bytes();

    c.bench_function("frame_1000_lines", |b| {
        b.iter(|| {
            let mut lines = LineReader::new(Cursor::new(black_box(input.as_slice())));
            let mut count = 0;
            while let Ok(Some(_)) = lines.read_line() {
                count += 1;
            }
            count
        })
    });

    let data = vec![0xA5u8; 1024 * 1024];
    c.bench_function("base64_1mib_slice", |b| {
        b.iter(|| {
            let mut out = Vec::with_capacity(1_400_000);
            write_base64(&mut out, Cursor::new(black_box(data.as_slice())), data.len() as u64)
                .map(|_| out.len())
        })
    });
}

criterion_group!(benches, parse_benchmarks, framing_benchmarks);
criterion_main!(benches);
