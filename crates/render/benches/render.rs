use criterion::{Criterion, black_box, criterion_group, criterion_main};
use mdpress_render::{render_for_feed, render_full};

const POST: &str = r#"# Release notes

Some *emphasis*, **strong** text and a [link](https://example.com).

> [!NOTE]
> Alerts render as callouts.

:::center
Centered paragraph with $e^{i\pi} + 1 = 0$.
:::

| Feature | Status |
|:--------|-------:|
| Tables  | done   |

```rust
fn main() {
    println!("hello");
}
```

$$
\sum_{k=1}^{n} k = \frac{n(n+1)}{2}
$$

A claim with a footnote[^1].

[^1]: The footnote body.
"#;

fn bench_render(c: &mut Criterion) {
    c.bench_function("render_full", |b| b.iter(|| render_full(black_box(POST))));
    c.bench_function("render_for_feed", |b| {
        b.iter(|| render_for_feed(black_box(POST)))
    });
}

criterion_group!(benches, bench_render);
criterion_main!(benches);
