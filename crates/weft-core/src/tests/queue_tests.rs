use super::*;
use proptest::prelude::*;

#[test]
fn pop_yields_values_in_push_order_then_none() {
    let mut queue: Queue<i32> = [1, 2, 3].into_iter().collect();
    assert_eq!(queue.pop(), Some(1));
    assert_eq!(queue.pop(), Some(2));
    assert_eq!(queue.pop(), Some(3));
    assert_eq!(queue.pop(), None);
    assert_eq!(queue.len(), 0);
    assert!(queue.is_empty());
}

#[test]
fn front_and_back_track_the_ends() {
    let mut queue = Queue::new();
    assert_eq!(queue.front(), None);
    assert_eq!(queue.back(), None);
    queue.push("a");
    queue.push("b");
    assert_eq!(queue.front(), Some(&"a"));
    assert_eq!(queue.back(), Some(&"b"));
    queue.pop();
    assert_eq!(queue.front(), Some(&"b"));
    assert_eq!(queue.back(), Some(&"b"));
}

#[test]
fn remove_takes_only_the_first_occurrence() {
    let mut queue: Queue<i32> = [1, 2, 1, 3].into_iter().collect();
    assert!(queue.remove(&1));
    assert_eq!(queue.to_vec(), vec![2, 1, 3]);
    assert!(!queue.remove(&7));
    assert_eq!(queue.len(), 3);
}

#[test]
fn remove_all_relinks_around_every_match() {
    let mut queue: Queue<i32> = [4, 1, 4, 4, 2, 4].into_iter().collect();
    assert_eq!(queue.remove_all(&4), 4);
    assert_eq!(queue.to_vec(), vec![1, 2]);
    assert_eq!(queue.back(), Some(&2));

    assert_eq!(queue.remove_all(&1), 1);
    assert_eq!(queue.remove_all(&2), 1);
    assert!(queue.is_empty());
    assert_eq!(queue.back(), None);
}

#[test]
fn clear_drops_everything() {
    let mut queue: Queue<i32> = (0..10).collect();
    queue.clear();
    assert!(queue.is_empty());
    assert_eq!(queue.pop(), None);
    queue.push(5);
    assert_eq!(queue.to_vec(), vec![5]);
}

#[test]
fn enumeration_helpers() {
    let queue: Queue<i32> = [1, 2, 3, 4].into_iter().collect();
    assert!(queue.any(|v| *v == 3));
    assert!(!queue.any(|v| *v == 9));
    assert!(queue.all(|v| *v > 0));
    assert!(!queue.all(|v| *v > 1));
    assert_eq!(queue.filter(|v| v % 2 == 0), vec![&2, &4]);
    assert_eq!(queue.map(|v| v * 10), vec![10, 20, 30, 40]);
    assert_eq!(
        queue.for_each_until(|v, index| (*v == 3).then_some(index)),
        Some(2)
    );
    assert_eq!(queue.for_each_until(|_, _| None::<()>), None);
    assert!(Queue::<i32>::new().all(|_| false));
}

proptest! {
    #[test]
    fn behaves_like_a_fifo(values in prop::collection::vec(any::<u16>(), 0..64)) {
        let mut queue = Queue::new();
        for value in &values {
            queue.push(*value);
        }
        prop_assert_eq!(queue.len(), values.len());
        let mut popped = Vec::new();
        while let Some(value) = queue.pop() {
            popped.push(value);
        }
        prop_assert_eq!(popped, values);
        prop_assert!(queue.is_empty());
    }

    #[test]
    fn remove_all_keeps_relative_order(
        values in prop::collection::vec(0u8..4, 0..64),
        target in 0u8..4,
    ) {
        let mut queue: Queue<u8> = values.iter().copied().collect();
        let removed = queue.remove_all(&target);
        let expected: Vec<u8> = values.iter().copied().filter(|v| *v != target).collect();
        prop_assert_eq!(removed, values.len() - expected.len());
        prop_assert_eq!(queue.to_vec(), expected);
    }
}
