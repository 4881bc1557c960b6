use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use roomlock::clock::ManualClock;
use roomlock::directory::{InMemoryRequesterDirectory, InMemoryResourceDirectory, UlidGenerator};
use roomlock::model::{Ms, Requester, ResourceId, RequesterId, Resource};
use roomlock::{Coordinator, ReservationError};

const HOUR: Ms = 3_600_000; // 1 hour in ms
const T0: Ms = 1_767_225_600_000;

fn percentile(sorted: &[Duration], p: f64) -> Duration {
    if sorted.is_empty() {
        return Duration::ZERO;
    }
    let idx = ((sorted.len() as f64) * p / 100.0) as usize;
    sorted[idx.min(sorted.len() - 1)]
}

fn print_latency(label: &str, latencies: &mut [Duration]) {
    if latencies.is_empty() {
        println!("  {label}: no samples");
        return;
    }
    latencies.sort();
    let total: Duration = latencies.iter().sum();
    let avg = total / latencies.len() as u32;
    println!("  {label}:");
    println!(
        "    n={}, avg={:.3}ms, p50={:.3}ms, p95={:.3}ms, p99={:.3}ms, max={:.3}ms",
        latencies.len(),
        avg.as_secs_f64() * 1000.0,
        percentile(latencies, 50.0).as_secs_f64() * 1000.0,
        percentile(latencies, 95.0).as_secs_f64() * 1000.0,
        percentile(latencies, 99.0).as_secs_f64() * 1000.0,
        latencies[latencies.len() - 1].as_secs_f64() * 1000.0,
    );
}

fn setup(n_rooms: usize, n_people: usize) -> Arc<Coordinator> {
    let resources = Arc::new(InMemoryResourceDirectory::new());
    for i in 0..n_rooms {
        resources
            .insert(Resource {
                id: format!("R{i}").into(),
                name: format!("Room {i}"),
                capacity: 4 + (i % 4) as u32 * 4,
                location: format!("Floor {}", i % 5),
            })
            .expect("seed room");
    }
    let requesters = Arc::new(InMemoryRequesterDirectory::new());
    for i in 0..n_people {
        requesters
            .insert(Requester {
                id: format!("E{i}").into(),
                name: format!("Employee {i}"),
                contact: format!("e{i}@example.com"),
            })
            .expect("seed requester");
    }
    println!("  created {n_rooms} rooms, {n_people} requesters");
    Arc::new(Coordinator::new(
        requesters,
        resources,
        Arc::new(UlidGenerator),
        Arc::new(ManualClock::new(T0)),
    ))
}

async fn phase1_sequential(coordinator: &Coordinator) {
    let n = 20_000;
    let room = ResourceId::from("R0");
    let who = RequesterId::from("E0");
    let mut latencies = Vec::with_capacity(n);
    let start = Instant::now();

    for i in 0..n {
        let s = T0 + (i as Ms) * HOUR;
        let t = Instant::now();
        coordinator
            .reserve(&who, &room, s, s + HOUR)
            .await
            .expect("sequential reserve");
        latencies.push(t.elapsed());
    }

    let elapsed = start.elapsed();
    let ops = n as f64 / elapsed.as_secs_f64();
    println!("  {n} bookings in {:.2}s = {ops:.0} ops/sec", elapsed.as_secs_f64());
    print_latency("reserve latency", &mut latencies);
}

async fn phase2_concurrent(coordinator: &Arc<Coordinator>, n_rooms: usize) {
    let n_tasks = 32;
    let n_per_task = 1_000;

    let start = Instant::now();
    let mut handles = Vec::new();
    for i in 0..n_tasks {
        let coordinator = coordinator.clone();
        // Skip R0, which phase 1 filled.
        let room = ResourceId::from(format!("R{}", 1 + i % (n_rooms - 1)));
        let who = RequesterId::from(format!("E{i}"));
        handles.push(tokio::spawn(async move {
            let mut ok = 0usize;
            for j in 0..n_per_task {
                // Tasks sharing a room interleave on disjoint hours.
                let s = T0 + ((j * n_tasks + i) as Ms) * HOUR;
                if coordinator.reserve(&who, &room, s, s + HOUR).await.is_ok() {
                    ok += 1;
                }
            }
            ok
        }));
    }

    let mut ok = 0;
    for h in handles {
        ok += h.await.expect("task panicked");
    }

    let elapsed = start.elapsed();
    let total = n_tasks * n_per_task;
    let ops = total as f64 / elapsed.as_secs_f64();
    println!(
        "  {n_tasks} tasks x {n_per_task} bookings = {total} total ({ok} ok) in {:.2}s = {ops:.0} ops/sec",
        elapsed.as_secs_f64()
    );
}

async fn phase3_contended(coordinator: &Arc<Coordinator>) {
    let n_tasks = 256;
    let room = ResourceId::from("R1");
    // Far beyond anything phase 2 booked.
    let s = T0 + 10_000_000 * HOUR;

    let start = Instant::now();
    let mut handles = Vec::new();
    for i in 0..n_tasks {
        let coordinator = coordinator.clone();
        let room = room.clone();
        let who = RequesterId::from(format!("E{}", i % 64));
        handles.push(tokio::spawn(async move {
            let t = Instant::now();
            let result = coordinator.reserve(&who, &room, s, s + HOUR).await;
            (result, t.elapsed())
        }));
    }

    let mut winners = 0;
    let mut rejected = 0;
    let mut latencies = Vec::with_capacity(n_tasks);
    for h in handles {
        let (result, latency) = h.await.expect("task panicked");
        latencies.push(latency);
        match result {
            Ok(_) => winners += 1,
            Err(ReservationError::ResourceUnavailable(..)) => rejected += 1,
            Err(e) => println!("  unexpected error: {e}"),
        }
    }

    println!(
        "  {n_tasks} tasks on one slot in {:.2}ms: {winners} confirmed, {rejected} rejected",
        start.elapsed().as_secs_f64() * 1000.0
    );
    assert_eq!(winners, 1, "exactly one reservation must win");
    print_latency("contended reserve latency", &mut latencies);
}

async fn phase4_availability_under_load(coordinator: &Arc<Coordinator>, n_rooms: usize) {
    let stop = Arc::new(AtomicBool::new(false));
    let writes = Arc::new(AtomicUsize::new(0));

    let mut writer_handles = Vec::new();
    for w in 0..8 {
        let coordinator = coordinator.clone();
        let stop = stop.clone();
        let writes = writes.clone();
        let room = ResourceId::from(format!("R{}", 1 + w % (n_rooms - 1)));
        let who = RequesterId::from(format!("E{w}"));
        writer_handles.push(tokio::spawn(async move {
            let mut i: Ms = 0;
            while !stop.load(Ordering::Relaxed) {
                let s = T0 + (20_000_000 + (w as Ms) * 1_000_000 + i) * HOUR;
                if coordinator.reserve(&who, &room, s, s + HOUR).await.is_ok() {
                    writes.fetch_add(1, Ordering::Relaxed);
                }
                i += 1;
                tokio::task::yield_now().await;
            }
        }));
    }

    let n_readers = 16;
    let reads_per_reader = 200;
    let mut reader_handles = Vec::new();
    for r in 0..n_readers {
        let coordinator = coordinator.clone();
        reader_handles.push(tokio::spawn(async move {
            let mut latencies = Vec::with_capacity(reads_per_reader);
            for i in 0..reads_per_reader {
                let s = T0 + ((r * reads_per_reader + i) as Ms) * HOUR;
                let t = Instant::now();
                coordinator
                    .available_resources(s, s + HOUR)
                    .await
                    .expect("availability query");
                latencies.push(t.elapsed());
            }
            latencies
        }));
    }

    let mut all_latencies = Vec::new();
    for h in reader_handles {
        all_latencies.extend(h.await.expect("reader panicked"));
    }

    stop.store(true, Ordering::Relaxed);
    for h in writer_handles {
        let _ = h.await;
    }

    println!("  {} writes landed during reads", writes.load(Ordering::Relaxed));
    print_latency("availability query", &mut all_latencies);
}

#[tokio::main]
async fn main() {
    let n_rooms: usize = std::env::var("ROOMLOCK_BENCH_ROOMS")
        .ok()
        .and_then(|s| s.parse().ok())
        .filter(|n| *n > 1)
        .unwrap_or(50);

    println!("=== roomlock stress benchmark ===\n");

    println!("[setup]");
    let coordinator = setup(n_rooms, 64);

    println!("\n[phase 1] sequential reserve throughput");
    phase1_sequential(&coordinator).await;

    println!("\n[phase 2] concurrent reserves across rooms");
    phase2_concurrent(&coordinator, n_rooms).await;

    println!("\n[phase 3] contended reserves on one slot");
    phase3_contended(&coordinator).await;

    println!("\n[phase 4] availability latency under write load");
    phase4_availability_under_load(&coordinator, n_rooms).await;

    println!(
        "\n=== done: {} bookings, {} resource locks ===",
        coordinator.booking_count(),
        coordinator.lock_count()
    );
}
