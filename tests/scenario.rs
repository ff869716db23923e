use fitpool::{Address, AllocError, PoolAllocator, ReleaseError, Strategy};

struct Trace {
  pool: PoolAllocator,
  a: Address,
  b: Address,
  c: Address,
  d: Address,
  e: Address,
}

/// allocate(100) a, b, c; release b; allocate(50) d; release a;
/// allocate(25) e, on a 500 byte pool.
fn run(strategy: Strategy) -> Trace {
  let mut pool = PoolAllocator::new();
  pool.initialize(strategy, 500).unwrap();

  let a = pool.allocate(100).unwrap();
  let b = pool.allocate(100).unwrap();
  let c = pool.allocate(100).unwrap();
  pool.release(b).unwrap();
  let d = pool.allocate(50).unwrap();
  pool.release(a).unwrap();
  let e = pool.allocate(25).unwrap();

  Trace { pool, a, b, c, d, e }
}

fn layout(pool: &PoolAllocator) -> Vec<(usize, usize, bool)> {
  pool
    .blocks()
    .map(|info| (info.address.offset(), info.size, info.is_free))
    .collect()
}

#[test]
fn test_first_fit_layout() {
  let trace = run(Strategy::First);

  assert_eq!((trace.a, trace.b, trace.c), (Address::new(0), Address::new(100), Address::new(200)));
  assert_eq!(trace.d, trace.b);
  assert_eq!(trace.e, trace.a);
  assert_eq!(
    layout(&trace.pool),
    vec![
      (0, 25, false),
      (25, 75, true),
      (100, 50, false),
      (150, 50, true),
      (200, 100, false),
      (300, 200, true),
    ]
  );
  assert_eq!(trace.pool.hole_count(), 3);
}

#[test]
fn test_best_fit_layout() {
  let trace = run(Strategy::Best);

  assert_eq!(trace.d, Address::new(100));
  assert_eq!(trace.e, Address::new(150));
  assert_eq!(
    layout(&trace.pool),
    vec![
      (0, 100, true),
      (100, 50, false),
      (150, 25, false),
      (175, 25, true),
      (200, 100, false),
      (300, 200, true),
    ]
  );
  assert_eq!(trace.pool.hole_count(), 3);
}

#[test]
fn test_worst_fit_layout() {
  let trace = run(Strategy::Worst);

  assert_eq!(trace.d, Address::new(300));
  assert_eq!(trace.e, Address::new(0));
  assert_eq!(
    layout(&trace.pool),
    vec![(0, 25, false), (25, 175, true), (200, 100, false), (300, 50, false), (350, 150, true)]
  );
  assert_eq!(trace.pool.hole_count(), 2);
}

#[test]
fn test_next_fit_layout() {
  let trace = run(Strategy::Next);

  assert_eq!(trace.d, Address::new(300));
  assert_eq!(trace.e, Address::new(350));
  assert_eq!(
    layout(&trace.pool),
    vec![(0, 200, true), (200, 100, false), (300, 50, false), (350, 25, false), (375, 125, true)]
  );
  assert_eq!(trace.pool.cursor(), Some(Address::new(375)));
  assert_eq!(trace.pool.hole_count(), 2);
}

#[test]
fn test_aggregates_agree_across_strategies() {
  for strategy in Strategy::ALL {
    let trace = run(strategy);
    let pool = &trace.pool;

    assert_eq!(pool.bytes_allocated(), 275, "{strategy}");
    assert_eq!(pool.bytes_free(), 225, "{strategy}");
    assert_eq!(pool.bytes_allocated() + pool.bytes_free(), pool.pool_total_size());
    assert_eq!(pool.is_allocated(trace.c), Some(true), "{strategy}");
    assert_eq!(pool.check_invariants(), Ok(()));
  }
}

#[test]
fn test_oversized_request_never_fits() {
  for strategy in Strategy::ALL {
    let mut trace = run(strategy);

    assert_eq!(
      trace.pool.allocate(501),
      Err(AllocError::ExceedsPool { requested: 501, total: 500 })
    );
    // Fits the pool, but not any single hole.
    assert!(matches!(trace.pool.allocate(300), Err(AllocError::NoFit { requested: 300, .. })));
  }
}

#[test]
fn test_double_release() {
  for strategy in Strategy::ALL {
    let mut trace = run(strategy);
    let status = trace.pool.status();

    assert_eq!(trace.pool.release(trace.c), Ok(()));
    let released = trace.pool.status();
    assert_ne!(released, status);

    assert_eq!(
      trace.pool.release(trace.c),
      Err(ReleaseError::AlreadyFree { address: trace.c })
    );
    assert_eq!(trace.pool.status(), released);
  }
}

#[test]
fn test_reinitialize_with_new_size() {
  for strategy in Strategy::ALL {
    let mut trace = run(strategy);

    trace.pool.initialize(strategy, 1024).unwrap();

    assert_eq!(trace.pool.hole_count(), 1);
    assert_eq!(trace.pool.bytes_free(), 1024);
    assert_eq!(trace.pool.bytes_allocated(), 0);
    assert_eq!(trace.pool.is_allocated(trace.c), None);
  }
}
