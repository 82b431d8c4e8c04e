use chrono::{Duration, NaiveDate, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use serde_json::json;
use tracker_core::{
    backend::Document,
    ledger::{self, Perspective},
    records,
};
use tracker_domain::{Money, Transaction, TransactionKind};

fn build_sample_transactions(count: usize) -> Vec<Transaction> {
    let start = Utc.with_ymd_and_hms(2025, 1, 1, 8, 0, 0).unwrap();
    (0..count)
        .map(|idx| Transaction {
            id: format!("txn-{idx}"),
            kind: TransactionKind::ALL[idx % TransactionKind::ALL.len()],
            amount: Money::from_cents(500 + (idx % 1_000) as i64),
            date: start + Duration::hours((idx % (24 * 365)) as i64),
            description: String::new(),
            owner_id: "bench".into(),
        })
        .collect()
}

fn bench_balances(c: &mut Criterion) {
    let transactions = build_sample_transactions(black_box(10_000));
    let reference = NaiveDate::from_ymd_opt(2025, 6, 15).unwrap();

    c.bench_function("personal_balance_10k", |b| {
        b.iter(|| black_box(ledger::balance(&transactions, Perspective::Personal)))
    });

    c.bench_function("weekly_expenses_10k", |b| {
        b.iter(|| black_box(ledger::weekly_expenses(&transactions, reference)))
    });

    c.bench_function("recent_activity_10k", |b| {
        b.iter(|| black_box(ledger::recent_activity(&transactions, 5)))
    });
}

fn bench_decoding(c: &mut Criterion) {
    let documents: Vec<Document> = (0..10_000)
        .map(|idx| Document {
            id: format!("doc-{idx}"),
            data: json!({
                "type": if idx % 2 == 0 { "income" } else { "expense" },
                "amount": 12.5 + (idx % 50) as f64,
                "date": "2025-03-04T10:00:00Z",
                "description": "bench",
            }),
        })
        .collect();
    let now = Utc::now();

    c.bench_function("decode_transactions_10k", |b| {
        b.iter(|| black_box(records::decode_transactions(&documents, "bench", now)))
    });
}

criterion_group!(benches, bench_balances, bench_decoding);
criterion_main!(benches);
