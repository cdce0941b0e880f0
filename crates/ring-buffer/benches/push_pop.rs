use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ring_buffer::{PopMode, Queue};

fn push_pop_cycle(c: &mut Criterion) {
    let q: Queue<u8> = Queue::new(256);
    c.bench_function("queue_push_pop_256", |b| {
        b.iter(|| {
            q.push(black_box(&[1u8, 2, 3, 4]));
            let mut out = [0u8; 4];
            q.pop(&mut out, PopMode::Consume);
            black_box(out);
        });
    });
}

criterion_group!(benches, push_pop_cycle);
criterion_main!(benches);
