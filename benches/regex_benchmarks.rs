use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use jsregexp::{Flags, RegExpStatics, Regex, Subject};

const PARAGRAPH: &str = "Tom appeared on the sidewalk with a bucket of whitewash and a \
    long-handled brush. He surveyed the fence, and all gladness left him and a deep \
    melancholy settled down upon his spirit. Thirty yards of board fence nine feet high. \
    Huckleberry Finn came by at 10:45, whistling; Sawyer kept working. Mail: tom@example.org\n";

fn text(copies: usize) -> String {
    PARAGRAPH.repeat(copies)
}

const PATTERNS: &[(&str, &str)] = &[
    ("simple_literal", "Huckleberry"),
    ("character_class", "[a-z]ence"),
    ("alternation", "Huck[a-zA-Z]+|Saw[a-zA-Z]+"),
    ("word_boundary", r"\b\w+nn\b"),
    ("multi_alternation", "Tom|Sawyer|Huckleberry|Finn"),
    ("bounded_repeat", ".{2,4}(Tom|Sawyer|Huckleberry|Finn)"),
    ("word_suffix", "[a-zA-Z]+ing"),
    ("digit_sequence", r"\d+"),
    ("backreference", r"(\w)\1"),
    ("lookahead", r"\w+(?=,)"),
    ("email_pattern", r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}"),
];

fn bench_regex_compile(c: &mut Criterion) {
    let mut group = c.benchmark_group("regex_compile");

    for (name, pattern) in PATTERNS {
        group.bench_with_input(BenchmarkId::new("compile", name), pattern, |b, pattern| {
            b.iter(|| Regex::new(pattern).unwrap())
        });
    }

    group.finish();
}

fn bench_regex_find_all(c: &mut Criterion) {
    let mut group = c.benchmark_group("regex_find_all");

    for (text_name, copies) in [("small", 4), ("medium", 64)] {
        let subject = Subject::from(text(copies));
        group.throughput(Throughput::Elements(subject.len() as u64));

        for (pattern_name, pattern) in PATTERNS {
            let regex = Regex::new(pattern).unwrap();
            let bench_name = format!("{}_on_{}", pattern_name, text_name);

            group.bench_with_input(
                BenchmarkId::new("find_all", bench_name),
                &subject,
                |b, subject| b.iter(|| regex.find_iter(subject).count()),
            );
        }
    }

    group.finish();
}

fn bench_regex_replace_all(c: &mut Criterion) {
    let mut group = c.benchmark_group("regex_replace_all");

    let replace_patterns = [
        ("simple_literal", "Tom", "Thomas"),
        ("word_suffix", r"(\w+)ing", "$1ed"),
        ("character_class", "[0-9]+", "NUM"),
        ("registers", r"\bfence\b", "[$`]"),
    ];

    for (text_name, copies) in [("small", 4), ("medium", 64)] {
        let subject = Subject::from(text(copies));
        group.throughput(Throughput::Elements(subject.len() as u64));

        for (pattern_name, pattern, template) in &replace_patterns {
            let mut regex = Regex::with_flags(pattern, "g").unwrap();
            let mut statics = RegExpStatics::new();
            let bench_name = format!("{}_on_{}", pattern_name, text_name);

            group.bench_with_input(
                BenchmarkId::new("replace_all", bench_name),
                &subject,
                |b, subject| b.iter(|| regex.replace(subject, template, &mut statics).unwrap()),
            );
        }
    }

    group.finish();
}

fn bench_regex_split(c: &mut Criterion) {
    let mut group = c.benchmark_group("regex_split");
    let subject = Subject::from(text(16));
    group.throughput(Throughput::Elements(subject.len() as u64));

    for (name, pattern) in [("whitespace", r"\s+"), ("punctuation", r"([,.!?;:])")] {
        let regex = Regex::new(pattern).unwrap();
        let mut statics = RegExpStatics::new();
        group.bench_with_input(BenchmarkId::new("split", name), &subject, |b, subject| {
            b.iter(|| regex.split(subject, None, &mut statics).unwrap().len())
        });
    }

    group.finish();
}

fn bench_pathological_cases(c: &mut Criterion) {
    let mut group = c.benchmark_group("pathological_cases");

    let pathological_patterns = [
        ("nested_quantifiers", r"(a+)+b", "aaaaaaaaaaaaaaaa"),
        ("alternation_backtrack", r"(a|a)*b", "aaaaaaaaaaaa"),
        ("nested_stars", r"((a)*)*b", "aaaaaaaaaaaaaaaa"),
    ];

    for (name, pattern, input) in &pathological_patterns {
        let regex = Regex::new(pattern).unwrap();
        let subject = Subject::from(*input);

        group.bench_with_input(BenchmarkId::new("pathological", name), &subject, |b, subject| {
            b.iter(|| regex.find(subject).is_some())
        });
    }

    group.finish();
}

fn bench_case_insensitive(c: &mut Criterion) {
    let mut group = c.benchmark_group("case_insensitive");

    let ci_patterns = [
        ("tom_ci", "tom"),
        ("huckleberry_ci", "huckleberry"),
        ("class_ci", "[a-f]ence"),
    ];

    for (text_name, copies) in [("small", 4), ("medium", 64)] {
        let subject = Subject::from(text(copies));
        group.throughput(Throughput::Elements(subject.len() as u64));

        for (pattern_name, pattern) in &ci_patterns {
            let flags = Flags {
                icase: true,
                ..Default::default()
            };
            let regex = Regex::with_config(pattern, flags, Default::default()).unwrap();
            let bench_name = format!("{}_on_{}", pattern_name, text_name);

            group.bench_with_input(
                BenchmarkId::new("case_insensitive", bench_name),
                &subject,
                |b, subject| b.iter(|| regex.find_iter(subject).count()),
            );
        }
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_regex_compile,
    bench_regex_find_all,
    bench_regex_replace_all,
    bench_regex_split,
    bench_case_insensitive,
    bench_pathological_cases
);
criterion_main!(benches);
