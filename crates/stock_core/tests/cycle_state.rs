use stock_core::{CycleState, Headers};

fn headers(agent: &str) -> Headers {
    Headers::from([("User-Agent".to_string(), agent.to_string())])
}

#[test]
fn starts_in_first_cycle_on_first_proxy() {
    let state = CycleState::new(headers("a"));
    assert!(state.is_first_cycle());
    assert_eq!(state.proxy_index(), 0);
    assert_eq!(state.consecutive_failures(), 0);
    assert_eq!(state.headers()["User-Agent"], "a");
}

#[test]
fn failures_walk_the_proxy_list_circularly() {
    let proxies = vec![
        "10.0.0.1:8080".to_string(),
        "10.0.0.2:8080".to_string(),
        "10.0.0.3:8080".to_string(),
    ];
    let mut state = CycleState::new(headers("a"));

    let mut seen = vec![state.proxy_index()];
    for agent in ["b", "c", "d"] {
        state.rotate(headers(agent), proxies.len());
        seen.push(state.proxy_index());
    }

    assert_eq!(seen, vec![0, 1, 2, 0]);
    assert_eq!(state.current_proxy(&proxies), Some("10.0.0.1:8080"));
    assert_eq!(state.headers()["User-Agent"], "d");
    assert_eq!(state.consecutive_failures(), 3);
    assert!(state.is_first_cycle());
}

#[test]
fn rotation_without_proxies_only_changes_identity() {
    let mut state = CycleState::new(headers("a"));
    state.rotate(headers("b"), 0);

    assert_eq!(state.proxy_index(), 0);
    assert_eq!(state.current_proxy(&[]), None);
    assert_eq!(state.headers()["User-Agent"], "b");
}

#[test]
fn completed_cycle_ends_suppression_and_resets_failures() {
    let mut state = CycleState::new(headers("a"));
    assert_eq!(state.begin_cycle(), 1);
    state.rotate(headers("b"), 2);
    assert_eq!(state.begin_cycle(), 2);
    state.complete_cycle();

    assert!(!state.is_first_cycle());
    assert_eq!(state.consecutive_failures(), 0);
    assert_eq!(state.proxy_index(), 1);
    assert_eq!(state.cycle(), 2);
}
