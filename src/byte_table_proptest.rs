#![cfg(test)]

// Property tests for ByteTable kept inside the crate so they can check
// structural counters next to the observable behaviour.

use crate::byte_table::{ByteTable, EraseOutcome, InsertOutcome, LOAD_FACTOR, MINIMUM_CAPACITY};
use crate::strategy::{FnStrategy, KeyStrategy};
use proptest::prelude::*;
use std::collections::{BTreeSet, HashMap};

const KEY: usize = 3;
const VALUE: usize = 2;

// Pool-indexed operations: indices shrink toward earlier keys, op lists
// shrink in length.
#[derive(Clone, Debug)]
enum OpI {
    Insert(usize, [u8; VALUE]),
    Erase(usize),
    Lookup(usize),
    Contains(usize),
    Overwrite(usize, [u8; VALUE]),
    Reserve(usize),
    Clear,
    Iterate,
}

fn arb_scenario() -> impl Strategy<Value = (Vec<[u8; KEY]>, Vec<OpI>)> {
    proptest::collection::vec(any::<[u8; KEY]>(), 1..=40).prop_flat_map(|pool| {
        let idx = 0..pool.len();
        let op = prop_oneof![
            6 => (idx.clone(), any::<[u8; VALUE]>()).prop_map(|(i, v)| OpI::Insert(i, v)),
            4 => idx.clone().prop_map(OpI::Erase),
            2 => idx.clone().prop_map(OpI::Lookup),
            2 => idx.clone().prop_map(OpI::Contains),
            1 => (idx.clone(), any::<[u8; VALUE]>()).prop_map(|(i, v)| OpI::Overwrite(i, v)),
            1 => (0usize..400).prop_map(OpI::Reserve),
            1 => Just(OpI::Clear),
            1 => Just(OpI::Iterate),
        ];
        proptest::collection::vec(op, 1..150).prop_map(move |ops| (pool.clone(), ops))
    })
}

// Drives one scenario against std's HashMap as the model.
// Invariants exercised after every op:
// - len/is_empty parity with the model; size never exceeds capacity.
// - capacity never drops below the floor; threshold tracks capacity.
// - lookup/contains agree with the model byte for byte.
// - iteration yields exactly the model's key set.
fn run_state_machine<S: KeyStrategy>(
    mut sut: ByteTable<S>,
    pool: &[[u8; KEY]],
    ops: Vec<OpI>,
) -> Result<(), TestCaseError> {
    let mut model: HashMap<[u8; KEY], [u8; VALUE]> = HashMap::new();

    for op in ops {
        match op {
            OpI::Insert(i, v) => {
                let k = pool[i];
                let already = model.contains_key(&k);
                let outcome = sut.insert(&k, &v).expect("insert");
                if already {
                    prop_assert_eq!(outcome, InsertOutcome::Updated);
                } else {
                    prop_assert_eq!(outcome, InsertOutcome::Inserted);
                }
                model.insert(k, v);
            }
            OpI::Erase(i) => {
                let k = pool[i];
                let outcome = sut.erase(&k).expect("erase");
                match model.remove(&k) {
                    Some(_) => prop_assert_eq!(outcome, EraseOutcome::Erased),
                    None => prop_assert_eq!(outcome, EraseOutcome::NotFound),
                }
            }
            OpI::Lookup(i) => {
                let k = pool[i];
                let got = sut.lookup(&k).expect("lookup").map(|b| b.to_vec());
                prop_assert_eq!(got, model.get(&k).map(|v| v.to_vec()));
            }
            OpI::Contains(i) => {
                let k = pool[i];
                prop_assert_eq!(sut.contains(&k).expect("contains"), model.contains_key(&k));
            }
            OpI::Overwrite(i, v) => {
                let k = pool[i];
                if let Some(block) = sut.lookup_mut(&k).expect("lookup_mut") {
                    block.copy_from_slice(&v);
                    model.insert(k, v);
                } else {
                    prop_assert!(!model.contains_key(&k));
                }
            }
            OpI::Reserve(n) => {
                let before = sut.capacity();
                sut.reserve(n).expect("reserve");
                if n > before * LOAD_FACTOR {
                    prop_assert!(sut.capacity() >= before);
                } else {
                    prop_assert_eq!(sut.capacity(), before);
                }
            }
            OpI::Clear => {
                sut.clear().expect("clear");
                model.clear();
                prop_assert_eq!(sut.capacity(), MINIMUM_CAPACITY);
            }
            OpI::Iterate => {
                let s_keys: BTreeSet<Vec<u8>> = sut.iter().map(|(k, _)| k.to_vec()).collect();
                let m_keys: BTreeSet<Vec<u8>> = model.keys().map(|k| k.to_vec()).collect();
                prop_assert_eq!(s_keys, m_keys);
            }
        }

        prop_assert_eq!(sut.len(), model.len());
        prop_assert_eq!(sut.is_empty(), model.is_empty());
        prop_assert!(sut.len() <= sut.capacity());
        prop_assert!(sut.capacity() >= MINIMUM_CAPACITY);
        prop_assert_eq!(sut.threshold(), sut.capacity() * LOAD_FACTOR);
    }

    for (k, v) in &model {
        prop_assert_eq!(sut.lookup(k).expect("lookup"), Some(&v[..]));
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario(), capacity in 0usize..40) {
        let sut = ByteTable::setup(KEY, VALUE, capacity).expect("setup");
        run_state_machine(sut, &pool, ops)?;
    }
}

// Same invariants with every key in one chain: stresses equality probing,
// head/interior unlinking and rehash of long chains.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_with_collisions((pool, ops) in arb_scenario()) {
        let strategy = FnStrategy::new(|_: &[u8]| 0u64, |a: &[u8], b: &[u8]| a == b);
        let sut = ByteTable::setup_with_strategy(KEY, VALUE, 0, strategy).expect("setup");
        run_state_machine(sut, &pool, ops)?;
    }
}
