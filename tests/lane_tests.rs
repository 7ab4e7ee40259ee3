//! Lane, signal ring and event queue behaviour

use intersection_sim::simulation::{
    ArrivalLaw, Event, EventKind, EventQueue, Lane, LaneError, LaneId, LaneKind, RingId, Routing,
    SignalId, SignalRings, SimRng, SimulationCounters, Turn, Vehicle, VEHICLE_BASE_SIZE,
    VEHICLE_SIZE_VARIATION,
};

fn exit_lane(capacity: u32, velocity: u32) -> Lane {
    Lane::new(LaneId(0), "out", LaneKind::Exit, capacity, velocity)
}

fn routing(prob_left: f64, prob_right: f64) -> Routing {
    Routing {
        signal: SignalId::new(RingId(0), 0),
        left: LaneId(1),
        straight: LaneId(2),
        right: LaneId(3),
        prob_left,
        prob_right,
    }
}

fn assert_lane_invariants(lane: &Lane, queued_sizes: u32) {
    assert_eq!(lane.capacity_remaining() + queued_sizes, lane.capacity());
    assert_eq!(lane.entered() - lane.left(), lane.are_in());
    assert_eq!(lane.are_in(), lane.len() as u64);
}

#[test]
fn test_random_vehicle_sizes_stay_in_range() {
    let mut rng = SimRng::seeded(11);
    for _ in 0..500 {
        let size = Vehicle::random(&mut rng).size();
        assert!(size >= VEHICLE_BASE_SIZE);
        assert!(size < VEHICLE_BASE_SIZE + VEHICLE_SIZE_VARIATION);
    }
}

#[test]
fn test_add_and_pop_track_capacity_and_counters() {
    let mut counters = SimulationCounters::new();
    let mut lane = exit_lane(20, 10);

    lane.add(Vehicle::new(6), &mut counters).unwrap();
    lane.add(Vehicle::new(8), &mut counters).unwrap();
    assert_eq!(lane.capacity_remaining(), 6);
    assert_lane_invariants(&lane, 14);

    let first = lane.pop(&mut counters).unwrap();
    assert_eq!(first.size(), 6, "lanes are FIFO");
    assert_eq!(lane.capacity_remaining(), 12);
    assert_lane_invariants(&lane, 8);

    assert_eq!(lane.entered(), 2);
    assert_eq!(lane.left(), 1);
    assert_eq!(counters.grand_total_entered, 2);
    assert_eq!(counters.grand_total_left, 1);
}

#[test]
fn test_add_to_full_lane_changes_nothing() {
    let mut counters = SimulationCounters::new();
    let mut lane = exit_lane(10, 10);
    lane.add(Vehicle::new(7), &mut counters).unwrap();

    let err = lane.add(Vehicle::new(5), &mut counters).unwrap_err();
    assert_eq!(
        err,
        LaneError::CapacityExceeded {
            lane: LaneId(0),
            size: 5,
            remaining: 3,
        }
    );
    assert_eq!(lane.entered(), 1);
    assert_eq!(lane.capacity_remaining(), 3);
    assert_eq!(counters.grand_total_entered, 1);
    assert_lane_invariants(&lane, 7);
}

#[test]
fn test_vehicle_exactly_filling_lane_fits() {
    let mut counters = SimulationCounters::new();
    let mut lane = exit_lane(8, 10);
    lane.add(Vehicle::new(8), &mut counters).unwrap();
    assert_eq!(lane.capacity_remaining(), 0);
}

#[test]
fn test_pop_on_empty_lane_fails() {
    let mut counters = SimulationCounters::new();
    let mut lane = exit_lane(10, 10);
    assert_eq!(
        lane.pop(&mut counters).unwrap_err(),
        LaneError::Empty { lane: LaneId(0) }
    );
    assert_eq!(lane.left(), 0);
    assert_eq!(counters.grand_total_left, 0);
}

#[test]
fn test_travel_time_truncates_to_zero_for_light_traffic() {
    let mut counters = SimulationCounters::new();
    let mut lane = exit_lane(1000, 10);
    assert_eq!(lane.travel_time(), 0);

    lane.add(Vehicle::new(8), &mut counters).unwrap();
    // 8 / 10 == 0 in integer arithmetic
    assert_eq!(lane.travel_time(), 0);
}

#[test]
fn test_travel_time_grows_with_occupancy() {
    let mut counters = SimulationCounters::new();
    let mut lane = exit_lane(1000, 10);
    lane.add(Vehicle::new(400), &mut counters).unwrap();
    // 400 / 10 = 40, 40 / 3.6 = 11.1
    assert_eq!(lane.travel_time(), 11);

    lane.add(Vehicle::new(330), &mut counters).unwrap();
    // 730 / 10 = 73, 73 / 3.6 = 20.3
    assert_eq!(lane.travel_time(), 20);
}

#[test]
fn test_routing_splits_probability_mass() {
    let routing = routing(0.3, 0.3);
    assert_eq!(routing.choose(0.0), (Turn::Left, LaneId(1)));
    assert_eq!(routing.choose(0.29), (Turn::Left, LaneId(1)));
    assert_eq!(routing.choose(0.5), (Turn::Straight, LaneId(2)));
    assert_eq!(routing.choose(0.9), (Turn::Right, LaneId(3)));
    assert_eq!(routing.choose(0.999), (Turn::Right, LaneId(3)));
}

#[test]
fn test_routing_without_turns_always_goes_straight() {
    let routing = routing(0.0, 0.0);
    for r in [0.0, 0.25, 0.5, 0.75, 0.9999] {
        assert_eq!(routing.choose(r).0, Turn::Straight);
    }
}

#[test]
fn test_fixed_arrival_law_has_no_jitter() {
    let mut rng = SimRng::seeded(3);
    let law = ArrivalLaw::new(10, 0);
    for now in [0, 10, 35] {
        assert_eq!(law.next_arrival(now, &mut rng), now + 10);
    }
}

#[test]
fn test_arrival_law_around_mean_stays_in_window() {
    let mut rng = SimRng::seeded(5);
    let law = ArrivalLaw::around_mean(10, 2);
    assert_eq!(law, ArrivalLaw::new(8, 4));

    let mut seen = std::collections::HashSet::new();
    for _ in 0..1000 {
        let next = law.next_arrival(100, &mut rng);
        assert!((108..=111).contains(&next), "arrival {next} outside window");
        seen.insert(next);
    }
    assert!(seen.len() > 1, "jitter never varied");
}

#[test]
fn test_next_interarrival_only_for_sources() {
    let mut rng = SimRng::seeded(1);
    let source = Lane::new(
        LaneId(0),
        "in",
        LaneKind::Source {
            arrivals: ArrivalLaw::new(7, 0),
            routing: routing(0.0, 0.0),
        },
        50,
        10,
    );
    assert_eq!(source.next_interarrival(3, &mut rng), Some(10));
    assert_eq!(exit_lane(50, 10).next_interarrival(3, &mut rng), None);
}

#[test]
fn test_ring_advance_flips_every_member_once() {
    let mut rings = SignalRings::new();
    let members = ["west", "south", "east", "north"]
        .iter()
        .enumerate()
        .map(|(i, name)| (name.to_string(), i == 0))
        .collect();
    let ring = rings.add_ring("S1", members);

    let before = rings.ring(ring).unwrap().states().to_vec();
    assert_eq!(before, vec![true, false, false, false]);

    // Advancing through any member flips the whole ring
    assert!(rings.advance_ring(SignalId::new(ring, 2)));
    let after = rings.ring(ring).unwrap().states().to_vec();
    for (was, now) in before.iter().zip(&after) {
        assert_eq!(*now, !*was);
    }

    assert!(rings.advance_ring(SignalId::new(ring, 0)));
    assert_eq!(rings.ring(ring).unwrap().states(), before.as_slice());
}

#[test]
fn test_ring_lookup_and_unknown_signals() {
    let mut rings = SignalRings::new();
    let ring = rings.add_ring("S2", vec![("west".to_string(), true), ("east".to_string(), false)]);

    assert_eq!(rings.find("S2", "east"), Some(SignalId::new(ring, 1)));
    assert_eq!(rings.find("S2", "north"), None);
    assert_eq!(rings.is_open(SignalId::new(ring, 0)), Some(true));
    assert_eq!(rings.is_open(SignalId::new(ring, 5)), None);
    assert!(!rings.advance_ring(SignalId::new(RingId(9), 0)));
    assert!(!rings.advance_ring(SignalId::new(ring, 2)));
}

#[test]
fn test_queue_pops_in_time_order() {
    let mut queue = EventQueue::new();
    for (i, time) in [50, 3, 17, 3, 0, 42, 17, 8].iter().enumerate() {
        queue.push(Event::remove_vehicle(*time, LaneId(i)));
    }
    assert_eq!(queue.len(), 8);
    assert_eq!(queue.peek_time(), Some(0));

    let mut last = i64::MIN;
    while let Some(event) = queue.pop() {
        assert!(event.time >= last);
        last = event.time;
    }
    assert!(queue.is_empty());
    assert_eq!(queue.peek_time(), None);
}

#[test]
fn test_queue_breaks_ties_by_insertion_order() {
    let mut queue = EventQueue::new();
    queue.push(Event::advance_vehicle(10, LaneId(1)));
    queue.push(Event::create_vehicle(5, LaneId(2)));
    queue.extend([
        Event::advance_vehicle(10, LaneId(3)),
        Event::create_vehicle(10, LaneId(4)),
    ]);
    queue.push(Event::advance_vehicle(10, LaneId(5)));

    let order: Vec<_> = std::iter::from_fn(|| queue.pop()).collect();
    assert_eq!(
        order.iter().map(|e| e.time).collect::<Vec<_>>(),
        vec![5, 10, 10, 10, 10]
    );
    assert_eq!(order[1].kind, EventKind::AdvanceVehicle { lane: LaneId(1) });
    assert_eq!(order[2].kind, EventKind::AdvanceVehicle { lane: LaneId(3) });
    assert_eq!(order[3].kind, EventKind::CreateVehicle { source: LaneId(4) });
    assert_eq!(order[4].kind, EventKind::AdvanceVehicle { lane: LaneId(5) });
}
