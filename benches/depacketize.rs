use bytes::Bytes;
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

use av1_packet::depacketizer::Av1Depacketizer;
use av1_packet::packetizer::fragment;
use av1_packet::rtp::build_packet;
use av1_packet::stage::{MediaStage, Message};

/// Benchmark the fragmentation hot path.
fn bench_fragment(c: &mut Criterion) {
    let mut unit = vec![0xC0u8];
    unit.extend(std::iter::repeat(0xAB).take(100_000));
    let unit = Bytes::from(unit);

    let mut group = c.benchmark_group("packetizer");
    group.throughput(Throughput::Bytes(unit.len() as u64));

    group.bench_function("fragment_100k_at_1200", |b| {
        b.iter(|| fragment(black_box(&unit), 1200).unwrap());
    });

    group.finish();
}

/// Benchmark the reassembly hot path: one large frame per batch.
fn bench_depacketize(c: &mut Criterion) {
    let mut unit = vec![0xC0u8];
    unit.extend(std::iter::repeat(0xCD).take(50_000));
    let unit = Bytes::from(unit);

    let frags = fragment(&unit, 1200).unwrap();
    let last = frags.len() - 1;
    let packets: Vec<Message> = frags
        .iter()
        .enumerate()
        .map(|(i, frag)| Message::Media(build_packet(i as u16, 3000, 1, 96, i == last, frag)))
        .collect();

    let mut group = c.benchmark_group("depacketizer");
    group.throughput(Throughput::Bytes(unit.len() as u64));

    group.bench_function("reassemble_50k_frame", |b| {
        b.iter(|| {
            let mut dp = Av1Depacketizer::new();
            let mut batch = packets.clone();
            dp.incoming(black_box(&mut batch), &mut |_| {});
            batch
        });
    });

    group.finish();
}

criterion_group!(benches, bench_fragment, bench_depacketize);
criterion_main!(benches);
