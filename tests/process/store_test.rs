/*!
 * Persisted Store Tests
 * The same admission behaviour over SQLite, plus persistence across reopen
 */

use pretty_assertions::assert_eq;
use std::num::NonZeroUsize;
use std::path::Path;
use std::sync::Arc;
use std::thread;
use task_manager::{
    AddMode, ManualClock, Pid, Priority, ProcessError, ProcessRegistry, ProcessStore, SortMode,
    SqliteStore,
};
use tempfile::TempDir;

fn sqlite_registry(path: &Path, max: usize, clock: &Arc<ManualClock>) -> ProcessRegistry<SqliteStore> {
    let store = SqliteStore::open(path).unwrap();
    ProcessRegistry::builder(store, NonZeroUsize::new(max).unwrap())
        .with_clock(clock.clone())
        .build()
}

fn live<S: ProcessStore>(registry: &ProcessRegistry<S>) -> Vec<(Pid, Priority)> {
    registry
        .list_processes(SortMode::Pid)
        .unwrap()
        .into_iter()
        .map(|p| (p.pid, p.priority))
        .collect()
}

#[test]
fn test_prio_mode_scenario_on_sqlite() {
    let dir = TempDir::new().unwrap();
    let clock = Arc::new(ManualClock::new(1_000));
    let registry = sqlite_registry(&dir.path().join("taskman.db"), 2, &clock);

    registry.add_process(Priority::Low, AddMode::Default).unwrap();
    clock.advance(1);
    registry.add_process(Priority::Medium, AddMode::Default).unwrap();
    clock.advance(1);
    registry.add_process(Priority::High, AddMode::Prio).unwrap();

    assert_eq!(live(&registry), vec![(2, Priority::Medium), (3, Priority::High)]);
    assert_eq!(
        registry.add_process(Priority::Low, AddMode::Prio).unwrap_err(),
        ProcessError::NoLowerPriorityAvailable {
            requested: Priority::Low,
            max: 2
        }
    );
    assert_eq!(registry.backend(), "sqlite");
}

#[test]
fn test_fifo_and_default_on_sqlite() {
    let dir = TempDir::new().unwrap();
    let clock = Arc::new(ManualClock::new(1_000));
    let registry = sqlite_registry(&dir.path().join("taskman.db"), 1, &clock);

    registry.add_process(Priority::Low, AddMode::Default).unwrap();
    assert_eq!(
        registry.add_process(Priority::High, AddMode::Default).unwrap_err(),
        ProcessError::CapacityExceeded { max: 1 }
    );

    clock.advance(5);
    registry.add_process(Priority::Medium, AddMode::Fifo).unwrap();
    assert_eq!(live(&registry), vec![(2, Priority::Medium)]);
}

#[test]
fn test_kills_on_sqlite() {
    let dir = TempDir::new().unwrap();
    let clock = Arc::new(ManualClock::new(1_000));
    let registry = sqlite_registry(&dir.path().join("taskman.db"), 4, &clock);

    for priority in [Priority::Low, Priority::High, Priority::Low] {
        registry.add_process(priority, AddMode::Default).unwrap();
    }

    assert_eq!(registry.kill_process(2).unwrap().priority, Priority::High);
    assert_eq!(registry.kill_process(2).unwrap_err(), ProcessError::NotFound(2));
    assert_eq!(registry.kill_group(Priority::Low).unwrap(), 2);
    assert!(registry.is_empty().unwrap());
    assert_eq!(registry.kill_all().unwrap(), 0);
}

#[test]
fn test_processes_survive_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("taskman.db");
    let clock = Arc::new(ManualClock::new(2_000));

    {
        let registry = sqlite_registry(&path, 3, &clock);
        registry.add_process(Priority::High, AddMode::Default).unwrap();
        clock.advance(1);
        registry.add_process(Priority::Low, AddMode::Default).unwrap();
    }

    let registry = sqlite_registry(&path, 3, &clock);
    let processes = registry.list_processes(SortMode::StartTime).unwrap();
    assert_eq!(processes.len(), 2);
    assert_eq!(processes[0].pid, 1);
    assert_eq!(processes[0].start_time, 2_000);
    assert_eq!(processes[1].priority, Priority::Low);
}

#[test]
fn test_pids_are_not_reused_after_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("taskman.db");
    let clock = Arc::new(ManualClock::new(1_000));

    {
        let registry = sqlite_registry(&path, 3, &clock);
        registry.add_process(Priority::Low, AddMode::Default).unwrap();
        registry.add_process(Priority::Low, AddMode::Default).unwrap();
        registry.kill_all().unwrap();
    }

    let registry = sqlite_registry(&path, 3, &clock);
    let process = registry.add_process(Priority::Medium, AddMode::Default).unwrap();
    assert_eq!(process.pid, 3);
}

#[test]
fn test_reopened_store_shrinks_to_new_capacity() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("taskman.db");
    let clock = Arc::new(ManualClock::new(1_000));

    {
        let registry = sqlite_registry(&path, 3, &clock);
        for _ in 0..3 {
            registry.add_process(Priority::Low, AddMode::Default).unwrap();
            clock.advance(1);
        }
    }

    let registry = sqlite_registry(&path, 2, &clock);
    assert_eq!(
        registry.add_process(Priority::Low, AddMode::Default).unwrap_err(),
        ProcessError::CapacityExceeded { max: 2 }
    );

    let fifo = registry.add_process(Priority::High, AddMode::Fifo).unwrap();
    assert_eq!(live(&registry), vec![(3, Priority::Low), (fifo.pid, Priority::High)]);
    assert!(registry.len().unwrap() <= registry.max_processes());
}

#[test]
fn test_reopened_store_prio_rolls_back_when_too_few_lower() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("taskman.db");
    let clock = Arc::new(ManualClock::new(1_000));

    {
        let registry = sqlite_registry(&path, 3, &clock);
        for priority in [Priority::Low, Priority::High, Priority::High] {
            registry.add_process(priority, AddMode::Default).unwrap();
            clock.advance(1);
        }
    }

    let registry = sqlite_registry(&path, 2, &clock);
    assert_eq!(
        registry.add_process(Priority::High, AddMode::Prio).unwrap_err(),
        ProcessError::NoLowerPriorityAvailable {
            requested: Priority::High,
            max: 2
        }
    );
    assert_eq!(
        live(&registry),
        vec![(1, Priority::Low), (2, Priority::High), (3, Priority::High)]
    );
}

#[test]
fn test_rejected_add_does_not_consume_pid_on_sqlite() {
    let dir = TempDir::new().unwrap();
    let clock = Arc::new(ManualClock::new(1_000));
    let registry = sqlite_registry(&dir.path().join("taskman.db"), 2, &clock);

    registry.add_process(Priority::Low, AddMode::Default).unwrap();
    let last = registry.add_process(Priority::Medium, AddMode::Default).unwrap();

    assert_eq!(
        registry.add_process(Priority::High, AddMode::Default).unwrap_err(),
        ProcessError::CapacityExceeded { max: 2 }
    );
    assert!(registry.add_process(Priority::Low, AddMode::Prio).is_err());

    registry.kill_process(1).unwrap();
    let process = registry.add_process(Priority::High, AddMode::Default).unwrap();
    assert_eq!(process.pid, last.pid + 1);
}

#[test]
fn test_concurrent_connections_never_exceed_capacity() {
    const MAX: usize = 5;
    const WORKERS: usize = 4;

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("taskman.db");
    // Create the schema and switch to WAL before the workers connect
    drop(SqliteStore::open(&path).unwrap());

    let handles: Vec<_> = (0..WORKERS)
        .map(|worker| {
            let path = path.clone();
            thread::spawn(move || {
                let registry = ProcessRegistry::builder(
                    SqliteStore::open(&path).unwrap(),
                    NonZeroUsize::new(MAX).unwrap(),
                )
                .build();

                for i in 0..50 {
                    let mode = AddMode::ALL[(worker + i) % 3];
                    let priority = Priority::ALL[i % 3];
                    match registry.add_process(priority, mode) {
                        Ok(_) => {}
                        Err(err) => assert!(err.is_rejection(), "unexpected error: {}", err),
                    }
                    assert!(registry.len().unwrap() <= MAX);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    let registry = ProcessRegistry::builder(
        SqliteStore::open(&path).unwrap(),
        NonZeroUsize::new(MAX).unwrap(),
    )
    .build();
    assert_eq!(registry.len().unwrap(), MAX);
}
