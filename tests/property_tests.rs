use std::collections::{HashMap, HashSet};

use proptest::prelude::*;

use eventdispatch::{EventDispatcher, Handler};

const HANDLERS: usize = 6;
const TOPICS: u8 = 4;

#[derive(Debug, Clone)]
enum Op {
    Subscribe(u8, usize),
    Unsubscribe(u8, usize),
    UnsubscribeAll(u8),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (0..TOPICS, 0..HANDLERS).prop_map(|(t, h)| Op::Subscribe(t, h)),
        2 => (0..TOPICS, 0..HANDLERS).prop_map(|(t, h)| Op::Unsubscribe(t, h)),
        1 => (0..TOPICS).prop_map(Op::UnsubscribeAll),
    ]
}

proptest! {
    /// Registry behaves like a map of sets keyed by handler identity.
    #[test]
    fn prop_registry_behaves_like_set_map(ops in prop::collection::vec(op(), 0..120)) {
        let pool: Vec<Handler> = (0..HANDLERS).map(|_| Handler::from_sync(|_| ())).collect();
        let dispatcher = EventDispatcher::<u8>::new();
        let mut model: HashMap<u8, HashSet<usize>> = HashMap::new();

        for op in ops {
            match op {
                Op::Subscribe(t, h) => {
                    dispatcher.subscribe(t, pool[h].clone());
                    model.entry(t).or_default().insert(h);
                }
                Op::Unsubscribe(t, h) => {
                    dispatcher.unsubscribe(&t, &pool[h]);
                    if let Some(set) = model.get_mut(&t) {
                        set.remove(&h);
                    }
                }
                Op::UnsubscribeAll(t) => {
                    let expected = model.get_mut(&t).map_or(0, |set| {
                        let n = set.len();
                        set.clear();
                        n
                    });
                    prop_assert_eq!(dispatcher.unsubscribe_all(&t), expected);
                }
            }
        }

        for t in 0..TOPICS {
            let expected = model.get(&t).map_or(0, HashSet::len);
            prop_assert_eq!(dispatcher.subscriber_count(&t), expected);
            for (h, handler) in pool.iter().enumerate() {
                let in_model = model.get(&t).is_some_and(|set| set.contains(&h));
                prop_assert_eq!(dispatcher.is_subscribed(&t, handler), in_model);
            }
        }
        prop_assert_eq!(dispatcher.topic_count(), model.len());
    }
}

proptest! {
    /// Subscribing the same handler repeatedly never grows the set.
    #[test]
    fn prop_subscribe_is_idempotent(times in 1usize..20) {
        let handler = Handler::from_sync(|_| ());
        let dispatcher = EventDispatcher::<String>::new();
        for _ in 0..times {
            dispatcher.subscribe("topic", handler.clone());
        }
        prop_assert_eq!(dispatcher.subscriber_count("topic"), 1);
    }
}
