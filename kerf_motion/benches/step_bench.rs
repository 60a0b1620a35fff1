//! Pulse-path benchmark — measure `step`/`unstep` cost per interval.
//!
//! The pair runs at pulse cadence (potentially tens of kilohertz), so a
//! full window must stay far under the interval budget. Timing delays are
//! zeroed to expose the bookkeeping cost alone; direction is alternated
//! to exercise the cache-miss path in half the iterations.

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};

use kerf_common::config::MachineConfig;
use kerf_motion::axes::Axes;
use kerf_motion::builder::resolve_standard;

fn machine(n_axes: usize) -> Axes {
    let mut toml = String::from("[stepping]\npulse_us = 0\ndir_delay_us = 0\n");
    for (i, name) in ['x', 'y', 'z', 'a', 'b', 'c'].iter().enumerate().take(n_axes) {
        toml.push_str(&format!(
            "[axes.{name}]\nmotors = [{{ step_pin = \"gpio.{}\", dir_pin = \"gpio.{}\" }}]\n",
            2 * i,
            2 * i + 1,
        ));
    }
    let config = MachineConfig::from_toml(&toml).unwrap();
    let (axes, _banks) = resolve_standard(&config).unwrap();
    axes
}

fn bench_pulse_interval(c: &mut Criterion) {
    let mut group = c.benchmark_group("pulse_interval");
    group.significance_level(0.01);
    group.sample_size(500);

    for &n_axes in &[1, 3, 6] {
        let mut axes = machine(n_axes);
        axes.init();
        let step_mask = (1u16 << n_axes) - 1;
        let mut interval = 0u64;

        group.bench_with_input(BenchmarkId::new("axes", n_axes), &n_axes, |b, &_n| {
            b.iter(|| {
                interval += 1;
                // Flip direction every other interval to hit both the
                // cached and the rewrite path.
                let dir_mask = if interval % 2 == 0 { step_mask } else { 0 };
                axes.step(step_mask, dir_mask);
                axes.unstep();
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_pulse_interval);
criterion_main!(benches);
