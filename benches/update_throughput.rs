//! Benchmarks for the scan, synthesize and rewrite passes
//!
//! Runs on in-memory FLV streams of increasing length.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use flvmeta_media::{rewrite, scan, synthesize, ScanOptions, SynthesisOptions};
use std::io::Cursor;

/// Interleaved screen video and MP3 audio, one keyframe per second.
fn build_stream(frames: u32) -> Vec<u8> {
    let mut bytes = b"FLV\x01\x05\x00\x00\x00\x09\x00\x00\x00\x00".to_vec();
    let video_payload = vec![0x5Au8; 2048];
    let audio_payload = vec![0xA5u8; 417];

    for i in 0..frames {
        let frame_type: u8 = if i % 25 == 0 { 1 } else { 2 };
        let mut video = vec![(frame_type << 4) | 3, 0x11, 0x40, 0x10, 0xF0];
        video.extend_from_slice(&video_payload);
        push_tag(&mut bytes, 9, i * 40, &video);

        let mut audio = vec![0x2F];
        audio.extend_from_slice(&audio_payload);
        push_tag(&mut bytes, 8, i * 40 + 20, &audio);
    }
    bytes
}

fn push_tag(bytes: &mut Vec<u8>, tag_type: u8, timestamp: u32, body: &[u8]) {
    let size = (body.len() as u32).to_be_bytes();
    let ts = timestamp.to_be_bytes();
    bytes.push(tag_type);
    bytes.extend_from_slice(&size[1..]);
    bytes.extend_from_slice(&ts[1..]);
    bytes.push(ts[0]);
    bytes.extend_from_slice(&[0, 0, 0]);
    bytes.extend_from_slice(body);
    bytes.extend_from_slice(&(11 + body.len() as u32).to_be_bytes());
}

fn bench_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("scan");

    for frames in [250u32, 2_500, 25_000] {
        let stream = build_stream(frames);
        group.throughput(Throughput::Bytes(stream.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(frames), &stream, |b, s| {
            b.iter(|| scan(Cursor::new(black_box(s)), ScanOptions::default()))
        });
    }

    group.finish();
}

fn bench_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("update");

    for frames in [250u32, 2_500, 25_000] {
        let stream = build_stream(frames);
        group.throughput(Throughput::Bytes(stream.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(frames), &stream, |b, s| {
            b.iter(|| {
                let info = scan(Cursor::new(s), ScanOptions::default()).ok()?;
                let plan = synthesize(info, SynthesisOptions::default());
                let mut out = Vec::with_capacity(s.len() + 4096);
                rewrite(&mut Cursor::new(s), &mut out, &plan).ok()?;
                Some(black_box(out.len()))
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_scan, bench_update);
criterion_main!(benches);
