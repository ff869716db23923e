use std::process::ExitCode;

use fitpool::{PoolAllocator, Strategy};
use tracing_subscriber::EnvFilter;

/// Replays the classic five-request trace against a 500 byte pool and prints
/// the resulting layout. Each strategy produces a different layout.
///
/// ```text
/// cargo run --example try_pool -- worst
/// RUST_LOG=fitpool=trace cargo run --example try_pool -- next
/// ```
fn main() -> ExitCode {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::from_default_env())
    .with_target(false)
    .init();

  let strategy = match std::env::args().nth(1) {
    Some(name) => match name.parse::<Strategy>() {
      Ok(strategy) => strategy,
      Err(err) => {
        eprintln!("{err}");
        return ExitCode::FAILURE;
      }
    },
    None => Strategy::First,
  };

  let mut pool = PoolAllocator::new();
  if let Err(err) = pool.initialize(strategy, 500) {
    eprintln!("{err}");
    return ExitCode::FAILURE;
  }

  match run_trace(&mut pool) {
    Ok(()) => {
      println!("{}", pool.dump());
      println!("{}", pool.status());
      ExitCode::SUCCESS
    }
    Err(err) => {
      eprintln!("trace failed: {err}");
      ExitCode::FAILURE
    }
  }
}

fn run_trace(pool: &mut PoolAllocator) -> Result<(), Box<dyn std::error::Error>> {
  let a = pool.allocate(100)?;
  let b = pool.allocate(100)?;
  let c = pool.allocate(100)?;
  pool.release(b)?;
  let d = pool.allocate(50)?;
  pool.release(a)?;
  let e = pool.allocate(25)?;

  println!("a = {a}, b = {b}, c = {c}, d = {d}, e = {e}");
  Ok(())
}
