use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use typed_class::cast::{self, Kind};
use typed_class::{value, FieldDescriptor, Schema, TypedCollection, TypedRecord, Value};

fn benchmark_scalar_coercion(c: &mut Criterion) {
    let mut group = c.benchmark_group("coerce");

    let text_int = Value::from("  -2.4 marginal words");
    let hex = Value::from("0x7fff");
    let euro = Value::from("1.234.567,89");
    let map = value!({ "a": 1, "b": [1, 2, 3] });

    group.bench_function("integer_from_text", |b| {
        b.iter(|| cast::to_integer(black_box(&text_int), false))
    });
    group.bench_function("integer_from_hex", |b| {
        b.iter(|| cast::to_integer(black_box(&hex), false))
    });
    group.bench_function("float_with_separators", |b| {
        b.iter(|| cast::to_float(black_box(&euro), false))
    });
    group.bench_function("string_from_map", |b| {
        b.iter(|| cast::to_string(black_box(&map)))
    });
    group.bench_function("array_from_json", |b| {
        let json = Value::from(r#"{"a":1,"b":[1,2,3]}"#);
        b.iter(|| cast::to_array(black_box(&json)))
    });

    group.finish();
}

fn benchmark_collection_assign(c: &mut Criterion) {
    let mut group = c.benchmark_group("collection_assign");

    for size in [10, 100, 1000].iter() {
        let input = Value::from(
            (0..*size)
                .map(|i| Value::from(format!("{}", i)))
                .collect::<Vec<_>>(),
        );
        group.bench_with_input(BenchmarkId::from_parameter(size), &input, |b, input| {
            b.iter(|| TypedCollection::from_value(Kind::Int, black_box(input)))
        });
    }

    group.finish();
}

fn benchmark_record(c: &mut Criterion) {
    let address = Schema::builder("Address")
        .field(FieldDescriptor::string("street"))
        .field(FieldDescriptor::string("city"))
        .build()
        .unwrap();
    let schema = Schema::builder("User")
        .field(FieldDescriptor::int("id"))
        .field(FieldDescriptor::string("name"))
        .field(FieldDescriptor::string("email"))
        .field(FieldDescriptor::bool("active"))
        .field(FieldDescriptor::record("address", &address))
        .field(FieldDescriptor::collection("roles", Kind::String))
        .build()
        .unwrap();
    let input = value!({
        "id": "123",
        "name": "Alice",
        "email": "alice@example.com",
        "active": 1,
        "address": { "street": "Main St", "city": "Springfield" },
        "roles": ["admin", "dev"]
    });

    c.bench_function("record_from_map", |b| {
        b.iter(|| TypedRecord::from_value(&schema, black_box(&input)))
    });

    let json = r#"{"id":123,"name":"Alice","email":"alice@example.com","active":true}"#;
    let json = Value::from(json);
    c.bench_function("record_from_json", |b| {
        b.iter(|| TypedRecord::from_value(&schema, black_box(&json)))
    });

    let record = TypedRecord::from_value(&schema, &input).unwrap();
    c.bench_function("record_to_json", |b| b.iter(|| black_box(&record).to_json()));
}

criterion_group!(
    benches,
    benchmark_scalar_coercion,
    benchmark_collection_assign,
    benchmark_record
);
criterion_main!(benches);
