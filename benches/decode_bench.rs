//! dataVals decoder throughput.
//!
//! Run with: `cargo bench --bench decode`

use std::collections::HashMap;

use atlas::decode::{decode, decode_field_record, FuncType};
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode");
    group.throughput(Throughput::Elements(1));

    group.bench_function("add_state_positional", |b| {
        b.iter(|| decode(black_box("[1000,3,-1,300,1000,10]"), FuncType::AddState))
    });

    group.bench_function("keyed_lists_and_phases", |b| {
        let raw = "[1000,3,-1,300,TargetList:100/200/300,ShowState:1,ParamAdd_1:10,ParamAdd_3:30,ParamAdd_2:20]";
        b.iter(|| decode(black_box(raw), FuncType::AddState))
    });

    group.bench_function("class_drop_post_pass", |b| {
        b.iter(|| decode(black_box("[2,400,80017]"), FuncType::ClassDropUp))
    });

    // Three levels of dependent functions resolved through a lookup table.
    let lookup: HashMap<i64, FuncType> = [(10, FuncType::SubState), (20, FuncType::AddState)]
        .into_iter()
        .collect();
    group.bench_function("dependent_chain", |b| {
        let raw = "[1000,1,DependFuncId1:10,DependFuncVals1:[1000,1,DependFuncId1:20,DependFuncVals1:[500,3,-1,200]]]";
        b.iter(|| decode_field_record(black_box(raw), FuncType::SubState, &lookup))
    });

    group.finish();
}

criterion_group!(benches, bench_decode);
criterion_main!(benches);
