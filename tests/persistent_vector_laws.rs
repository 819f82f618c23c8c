#![cfg(feature = "persistent")]
//! Property-based tests for PersistentVector laws.
//!
//! This module verifies the invariants of PersistentVector using proptest,
//! including agreement with `VecDeque` under random operation sequences.

use std::collections::VecDeque;

use proptest::prelude::*;
use trie_vector::persistent::{OutOfBounds, PersistentVector};

#[derive(Debug, Clone)]
enum Operation {
    Append(i32),
    Prepend(i32),
    Set(usize, i32),
    Truncate(usize),
    DropFirst(usize),
    Pop,
    Shift,
}

fn operation_strategy() -> impl Strategy<Value = Operation> {
    prop_oneof![
        4 => any::<i32>().prop_map(Operation::Append),
        3 => any::<i32>().prop_map(Operation::Prepend),
        2 => (0..200_usize, any::<i32>()).prop_map(|(index, value)| Operation::Set(index, value)),
        1 => (0..200_usize).prop_map(Operation::Truncate),
        1 => (0..200_usize).prop_map(Operation::DropFirst),
        1 => Just(Operation::Pop),
        1 => Just(Operation::Shift),
    ]
}

fn apply(
    vector: &PersistentVector<i32>,
    model: &mut VecDeque<i32>,
    operation: &Operation,
) -> PersistentVector<i32> {
    match *operation {
        Operation::Append(value) => {
            model.push_back(value);
            vector.append(value)
        }
        Operation::Prepend(value) => {
            model.push_front(value);
            vector.prepend(value)
        }
        Operation::Set(index, value) => match vector.set(index, value) {
            Ok(updated) => {
                if index == model.len() {
                    model.push_back(value);
                } else {
                    model[index] = value;
                }
                updated
            }
            Err(error) => {
                assert_eq!(error, OutOfBounds { key: index });
                assert!(index > model.len());
                vector.clone()
            }
        },
        Operation::Truncate(length) => {
            model.truncate(length);
            vector.truncate(length)
        }
        Operation::DropFirst(count) => {
            model.drain(..count.min(model.len()));
            vector.drop_first(count)
        }
        Operation::Pop => {
            model.pop_back();
            vector.pop()
        }
        Operation::Shift => {
            model.pop_front();
            vector.shift()
        }
    }
}

proptest! {
    /// Get-Set Law: a set element is returned by get
    #[test]
    fn prop_get_set_law(
        elements in prop::collection::vec(any::<i32>(), 1..300),
        selector in any::<usize>(),
        new_value: i32
    ) {
        let vector: PersistentVector<i32> = elements.iter().copied().collect();
        let index = selector % vector.len();

        let updated = vector.set(index, new_value).unwrap();
        prop_assert_eq!(updated.get(index), Ok(&new_value));
        for other in (0..vector.len()).filter(|&other| other != index) {
            prop_assert_eq!(updated.get(other), vector.get(other));
        }
    }

    /// Non-interference Law: set leaves the receiver unchanged
    #[test]
    fn prop_set_does_not_modify_receiver(
        elements in prop::collection::vec(any::<i32>(), 1..300),
        selector in any::<usize>(),
        new_value: i32
    ) {
        let vector: PersistentVector<i32> = elements.iter().copied().collect();
        let index = selector % (vector.len() + 1);

        let _updated = vector.set(index, new_value).unwrap();
        let collected: Vec<i32> = vector.iter().copied().collect();
        prop_assert_eq!(collected, elements);
    }

    /// Append Law: n appends yield n elements in order
    #[test]
    fn prop_append_growth_law(elements in prop::collection::vec(any::<i32>(), 0..2000)) {
        let vector = elements
            .iter()
            .fold(PersistentVector::new(), |vector, &element| vector.append(element));

        prop_assert_eq!(vector.len(), elements.len());
        for (index, element) in elements.iter().enumerate() {
            prop_assert_eq!(vector.get(index), Ok(element));
        }
    }

    /// Bounds Law: get(len) and set(len + 1) fail with the offending key
    #[test]
    fn prop_bounds_law(elements in prop::collection::vec(any::<i32>(), 0..300)) {
        let vector: PersistentVector<i32> = elements.iter().copied().collect();
        let length = vector.len();

        prop_assert_eq!(vector.get(length), Err(OutOfBounds { key: length }));
        prop_assert_eq!(
            vector.set(length + 1, 0).err(),
            Some(OutOfBounds { key: length + 1 })
        );
    }

    /// Truncate Law: truncating twice to the same length equals truncating once
    #[test]
    fn prop_truncate_idempotent_law(
        elements in prop::collection::vec(any::<i32>(), 0..2000),
        length in 0..2100_usize
    ) {
        let vector: PersistentVector<i32> = elements.iter().copied().collect();
        let once = vector.truncate(length);
        prop_assert_eq!(once.truncate(length), once.clone());
        prop_assert_eq!(once.len(), length.min(elements.len()));
    }

    /// Append-Pop Law: pop undoes append
    #[test]
    fn prop_append_pop_law(
        elements in prop::collection::vec(any::<i32>(), 0..300),
        new_element: i32
    ) {
        let vector: PersistentVector<i32> = elements.iter().copied().collect();
        prop_assert_eq!(vector.append(new_element).pop(), vector);
    }

    /// Prepend-Shift Law: shift undoes prepend
    #[test]
    fn prop_prepend_shift_law(
        elements in prop::collection::vec(any::<i32>(), 0..300),
        new_element: i32
    ) {
        let vector: PersistentVector<i32> = elements.iter().copied().collect();
        let prepended = vector.prepend(new_element);

        prop_assert_eq!(prepended.first(), Some(&new_element));
        prop_assert_eq!(prepended.shift(), vector);
    }

    /// Split Law: truncate(n) followed by the elements of drop_first(n) rebuilds the vector
    #[test]
    fn prop_truncate_drop_split_law(
        elements in prop::collection::vec(any::<i32>(), 0..2000),
        split in 0..2100_usize
    ) {
        let vector: PersistentVector<i32> = elements.iter().copied().collect();
        let rebuilt = vector
            .drop_first(split)
            .iter()
            .fold(vector.truncate(split), |acc, &element| acc.append(element));

        prop_assert_eq!(rebuilt, vector);
    }

    /// Model Law: random operation sequences agree with VecDeque
    #[test]
    fn prop_matches_vecdeque_model(
        operations in prop::collection::vec(operation_strategy(), 0..400)
    ) {
        let mut model = VecDeque::new();
        let mut vector = PersistentVector::new();
        let mut history = Vec::new();

        for operation in &operations {
            let before: Vec<i32> = model.iter().copied().collect();
            let next = apply(&vector, &mut model, operation);
            history.push((vector, before));
            vector = next;

            prop_assert_eq!(vector.len(), model.len());
            prop_assert_eq!(vector.first(), model.front());
            prop_assert_eq!(vector.last(), model.back());
        }

        let collected: Vec<i32> = vector.iter().copied().collect();
        prop_assert_eq!(collected, model.iter().copied().collect::<Vec<_>>());

        // Earlier versions are untouched by everything applied after them.
        for (version, expected) in &history {
            let collected: Vec<i32> = version.iter().copied().collect();
            prop_assert_eq!(&collected, expected);
        }
    }
}
