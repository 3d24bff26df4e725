/*!
 * Process Registry Tests
 * Admission scenarios, kills and concurrent adds against the in-memory store
 */

use pretty_assertions::assert_eq;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::thread;
use task_manager::{
    AddMode, ManualClock, MemoryStore, Pid, Priority, ProcessError, ProcessRegistry, SortMode,
};

fn registry(max: usize) -> (ProcessRegistry, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(1_600_000_000_000_000));
    let registry = ProcessRegistry::builder(MemoryStore::new(), NonZeroUsize::new(max).unwrap())
        .with_clock(clock.clone())
        .build();
    (registry, clock)
}

fn live(registry: &ProcessRegistry) -> Vec<(Pid, Priority)> {
    registry
        .list_processes(SortMode::Pid)
        .unwrap()
        .into_iter()
        .map(|p| (p.pid, p.priority))
        .collect()
}

#[test]
fn test_prio_mode_scenario() {
    let (registry, clock) = registry(2);

    let low = registry.add_process(Priority::Low, AddMode::Default).unwrap();
    clock.advance(10);
    let medium = registry.add_process(Priority::Medium, AddMode::Default).unwrap();
    clock.advance(10);

    let high = registry.add_process(Priority::High, AddMode::Prio).unwrap();
    assert_eq!(
        live(&registry),
        vec![(medium.pid, Priority::Medium), (high.pid, Priority::High)]
    );
    assert_eq!(registry.get_process(low.pid).unwrap(), None);

    clock.advance(10);
    let err = registry.add_process(Priority::Low, AddMode::Prio).unwrap_err();
    assert_eq!(
        err,
        ProcessError::NoLowerPriorityAvailable {
            requested: Priority::Low,
            max: 2
        }
    );
    assert_eq!(registry.len().unwrap(), 2);
}

#[test]
fn test_fifo_mode_scenario() {
    let (registry, clock) = registry(1);

    let first = registry.add_process(Priority::Low, AddMode::Default).unwrap();
    clock.advance(1);
    let second = registry.add_process(Priority::Medium, AddMode::Fifo).unwrap();

    assert_ne!(first.pid, second.pid);
    assert_eq!(live(&registry), vec![(second.pid, Priority::Medium)]);
}

#[test]
fn test_fifo_evicts_regardless_of_priority() {
    let (registry, clock) = registry(2);

    registry.add_process(Priority::High, AddMode::Default).unwrap();
    clock.advance(1);
    registry.add_process(Priority::Low, AddMode::Default).unwrap();
    clock.advance(1);

    registry.add_process(Priority::Low, AddMode::Fifo).unwrap();
    assert_eq!(live(&registry), vec![(2, Priority::Low), (3, Priority::Low)]);
}

#[test]
fn test_same_timestamp_uses_pid_order() {
    let (registry, _) = registry(3);
    for _ in 0..3 {
        registry.add_process(Priority::Low, AddMode::Default).unwrap();
    }

    registry.add_process(Priority::Medium, AddMode::Fifo).unwrap();
    registry.add_process(Priority::High, AddMode::Prio).unwrap();
    assert_eq!(
        live(&registry),
        vec![(3, Priority::Low), (4, Priority::Medium), (5, Priority::High)]
    );
}

#[test]
fn test_kill_process_is_not_idempotent() {
    let (registry, _) = registry(2);
    let process = registry.add_process(Priority::Medium, AddMode::Default).unwrap();

    assert_eq!(registry.kill_process(process.pid).unwrap(), process);
    assert_eq!(
        registry.kill_process(process.pid).unwrap_err(),
        ProcessError::NotFound(process.pid)
    );
    assert_eq!(
        registry.kill_process(42).unwrap_err(),
        ProcessError::NotFound(42)
    );
}

#[test]
fn test_kill_group_leaves_other_priorities() {
    let (registry, clock) = registry(6);
    for priority in [
        Priority::Medium,
        Priority::Low,
        Priority::Medium,
        Priority::High,
        Priority::Medium,
    ] {
        registry.add_process(priority, AddMode::Default).unwrap();
        clock.advance(1);
    }

    assert_eq!(registry.kill_group(Priority::Medium).unwrap(), 3);
    assert_eq!(live(&registry), vec![(2, Priority::Low), (4, Priority::High)]);
    assert_eq!(registry.kill_group(Priority::Medium).unwrap(), 0);
}

#[test]
fn test_kill_all_then_add_keeps_counting() {
    let (registry, _) = registry(2);
    registry.add_process(Priority::Low, AddMode::Default).unwrap();
    registry.add_process(Priority::Low, AddMode::Default).unwrap();

    assert_eq!(registry.kill_all().unwrap(), 2);
    assert!(registry.is_empty().unwrap());

    let process = registry.add_process(Priority::High, AddMode::Default).unwrap();
    assert_eq!(process.pid, 3);
}

#[test]
fn test_listing_orders() {
    let (registry, clock) = registry(4);
    clock.set(300);
    registry.add_process(Priority::High, AddMode::Default).unwrap();
    clock.set(100);
    registry.add_process(Priority::Low, AddMode::Default).unwrap();
    clock.set(200);
    registry.add_process(Priority::Medium, AddMode::Default).unwrap();
    clock.set(50);
    registry.add_process(Priority::Low, AddMode::Default).unwrap();

    let pids = |sort| -> Vec<Pid> {
        registry
            .list_processes(sort)
            .unwrap()
            .iter()
            .map(|p| p.pid)
            .collect()
    };

    assert_eq!(pids(SortMode::StartTime), vec![4, 2, 3, 1]);
    assert_eq!(pids(SortMode::Pid), vec![1, 2, 3, 4]);
    assert_eq!(pids(SortMode::Priority), vec![2, 4, 3, 1]);
}

#[test]
fn test_concurrent_adds_never_exceed_capacity() {
    let (registry, _) = registry(8);
    let registry = Arc::new(registry);

    let handles: Vec<_> = (0..8)
        .map(|worker| {
            let registry = registry.clone();
            thread::spawn(move || {
                let mode = match worker % 3 {
                    0 => AddMode::Default,
                    1 => AddMode::Fifo,
                    _ => AddMode::Prio,
                };
                let priority = Priority::ALL[worker % 3];
                for _ in 0..50 {
                    let _ = registry.add_process(priority, mode);
                    assert!(registry.len().unwrap() <= 8);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    let processes = registry.list_processes(SortMode::Pid).unwrap();
    assert_eq!(processes.len(), 8);

    let mut pids: Vec<Pid> = processes.iter().map(|p| p.pid).collect();
    pids.dedup();
    assert_eq!(pids.len(), 8);
}
