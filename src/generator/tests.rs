use super::*;


/// Node specs exercising various node ID sizes.
pub(crate) const EXAMPLE_NODE_SPECS: &[&str] = &["0/1", "42/8", "334/16", "123456/23"];

/// Asserts that the later of two consecutively generated IDs either increments the `node_ctr`
/// field under the same `timestamp` or advances the `timestamp` by one unit.
pub(crate) fn assert_consecutive(first: Scru64Id, second: Scru64Id) {
    assert!(first < second);
    if first.timestamp() == second.timestamp() {
        assert_eq!(first.node_ctr() + 1, second.node_ctr());
    } else {
        assert_eq!(first.timestamp() + 1, second.timestamp());
    }
}

/// Exposes the node configuration via accessors
#[test]
fn exposes_node_configuration_via_accessors() {
    for e in EXAMPLE_NODE_SPECS {
        let node_spec: NodeSpec = e.parse().unwrap();
        let g = Scru64Generator::new(node_spec);
        assert_eq!(g.node_id(), node_spec.node_id());
        assert_eq!(g.node_id_size(), node_spec.node_id_size());
        assert_eq!(g.node_spec(), node_spec);
    }
}

/// Returns a node-prev node spec that resumes the monotonic order
#[test]
fn returns_node_prev_spec_that_resumes_monotonic_order() {
    let ts = 1_577_836_800_000u64; // 2020-01-01
    let mut g = Scru64Generator::new("42/8".parse().unwrap());

    let mut last = g
        .generate_or_abort_core(ts, DEFAULT_ROLLBACK_ALLOWANCE)
        .unwrap();
    for i in 1..256 {
        last = g
            .generate_or_abort_core(ts + i, DEFAULT_ROLLBACK_ALLOWANCE)
            .unwrap();
    }

    let node_spec = g.node_spec();
    assert_eq!(node_spec.node_prev(), Some(last));
    assert_eq!(node_spec.node_id(), 42);
    assert_eq!(node_spec.node_id_size(), 8);

    // a new generator built from the spec continues right after the last ID
    let mut h = Scru64Generator::new(node_spec);
    let next = h
        .generate_or_abort_core(ts, DEFAULT_ROLLBACK_ALLOWANCE)
        .unwrap();
    assert_consecutive(last, next);
}

/// Starts the counter at zero under the default counter mode
#[test]
fn starts_counter_at_zero_under_default_counter_mode() {
    let ts = 0x0123_4567_8900u64;
    let mut g = Scru64Generator::new("42/8".parse().unwrap());

    let x = g
        .generate_or_abort_core(ts, DEFAULT_ROLLBACK_ALLOWANCE)
        .unwrap();
    assert_eq!(x.timestamp(), ts >> 8);
    assert_eq!(x.node_ctr(), 42 << 16);

    let y = g
        .generate_or_abort_core(ts, DEFAULT_ROLLBACK_ALLOWANCE)
        .unwrap();
    assert_eq!(y.timestamp(), ts >> 8);
    assert_eq!(y.node_ctr(), (42 << 16) + 1);

    assert!(x < y);
    #[cfg(feature = "std")]
    assert!(x.to_string() < y.to_string());
}

/// Consults the counter mode once per timestamp tick
#[test]
fn consults_counter_mode_once_per_timestamp_tick() {
    struct Recorder {
        n_calls: u32,
    }

    impl CounterMode for Recorder {
        fn renew(&mut self, counter_size: u8, context: &RenewContext) -> u32 {
            assert_eq!(counter_size, 16);
            assert_eq!(context.node_id, 42);
            self.n_calls += 1;
            0
        }
    }

    let ts = 1_577_836_800_000u64;
    let mut g =
        Scru64Generator::with_counter_mode("42/8".parse().unwrap(), Recorder { n_calls: 0 });

    // four IDs under the first tick, then one under each of the next two ticks
    for _ in 0..4 {
        g.generate_or_abort_core(ts, DEFAULT_ROLLBACK_ALLOWANCE)
            .unwrap();
    }
    g.generate_or_abort_core(ts + 256, DEFAULT_ROLLBACK_ALLOWANCE)
        .unwrap();
    g.generate_or_abort_core(ts + 512, DEFAULT_ROLLBACK_ALLOWANCE)
        .unwrap();

    assert_eq!(g.counter_mode.n_calls, 3);
}

/// Embeds up-to-date timestamp
#[cfg(feature = "std")]
#[test]
fn embeds_up_to_date_timestamp() {
    fn now() -> u64 {
        unix_ts_ms() >> 8
    }

    for e in EXAMPLE_NODE_SPECS {
        let mut g = Scru64Generator::new(e.parse().unwrap());

        let mut ts_now = now();
        let mut x = g.generate().unwrap();
        assert!(x.timestamp().saturating_sub(ts_now) <= 1);

        ts_now = now();
        x = g.generate_or_reset().unwrap();
        assert!(x.timestamp().saturating_sub(ts_now) <= 1);

        ts_now = now();
        x = g.generate_or_sleep().unwrap();
        assert!(x.timestamp().saturating_sub(ts_now) <= 1);
    }
}

/// Is iterable with for-in loop
#[cfg(feature = "std")]
#[test]
fn is_iterable_with_for_in_loop() {
    let mut i = 0;
    for e in Scru64Generator::new("42/8".parse().unwrap()) {
        assert!(e.timestamp() > 0);
        i += 1;
        if i > 100 {
            break;
        }
    }
    assert_eq!(i, 101);
}
