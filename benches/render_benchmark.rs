use criterion::{Criterion, black_box, criterion_group, criterion_main};
use discord_time::internal::markup::render_markup;
use discord_time::{EnglishPhrases, TimestampRenderer, UnitTable, format_relative};
use jiff::tz::TimeZone;

const NOW_MS: i64 = 1_618_953_630_000;

fn benchmark_format_relative(c: &mut Criterion) {
    let table = UnitTable::discord();
    let phrases = EnglishPhrases::default();

    c.bench_function("format_relative minutes", |b| {
        b.iter(|| format_relative(black_box(1_618_953_540), black_box(NOW_MS), &table, &phrases))
    });

    c.bench_function("format_relative years", |b| {
        b.iter(|| format_relative(black_box(0), black_box(NOW_MS), &table, &phrases))
    });
}

fn benchmark_render_markup(c: &mut Criterion) {
    let renderer =
        TimestampRenderer::new(TimeZone::UTC, UnitTable::discord(), EnglishPhrases::default());
    let message = "Event starts <t:1618961730:F> (<t:1618961730:R>), doors open at <t:1618958000:t>.";

    c.bench_function("render_markup short", |b| {
        b.iter(|| render_markup(black_box(message), &renderer, black_box(NOW_MS)))
    });

    let long_message = message.repeat(50);
    c.bench_function("render_markup long", |b| {
        b.iter(|| render_markup(black_box(&long_message), &renderer, black_box(NOW_MS)))
    });
}

criterion_group!(benches, benchmark_format_relative, benchmark_render_markup);
criterion_main!(benches);
