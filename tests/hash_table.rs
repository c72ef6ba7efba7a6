use netsim_containers::{is_prime, next_prime, Error, HashTable, Scalar, TableConfig};
use std::collections::BTreeMap;

fn init_logging() {
    let _ = pretty_env_logger::try_init();
}

#[test]
fn next_prime_reference_values() {
    assert_eq!(next_prime(-3), 2);
    assert_eq!(next_prime(4), 5);
    assert_eq!(next_prime(158), 163);
}

#[test]
fn mixed_scalar_keys_from_single_slot() {
    init_logging();
    let cfg = TableConfig::default()
        .with_min_load_factor(0.33)
        .with_max_load_factor(1.0)
        .with_resize_factor(1.5);
    let mut t: HashTable<Scalar, Scalar> = HashTable::with_config(1, cfg).expect("valid config");
    t.put("hello".into(), "world".into()).unwrap();
    t.put(1.into(), 2.into()).unwrap();
    t.put("world".into(), "hello".into()).unwrap();

    assert_eq!(t.get(&Scalar::from("hello")), Ok(&Scalar::from("world")));
    assert_eq!(t.get(&Scalar::from(1)), Ok(&Scalar::from(2)));
    assert_eq!(t.get(&Scalar::from("world")), Ok(&Scalar::from("hello")));
    assert_ne!(t.get(&Scalar::from(1)), t.get(&Scalar::from("hello")));
    assert!(is_prime(t.capacity()));
}

/// Invariant: load factor stays inside the window through a grow-then-drain
/// cycle, and capacity is prime at every step.
#[test]
fn window_holds_through_growth_and_drain() {
    init_logging();
    let cfg = TableConfig::default()
        .with_min_load_factor(0.33)
        .with_max_load_factor(1.0)
        .with_resize_factor(1.5);
    let mut t: HashTable<u64, u64> = HashTable::with_config(1, cfg).unwrap();
    for i in 0..2_000u64 {
        t.put(i * 7_919, i).unwrap();
        assert!(t.load_factor() <= 1.0);
        assert!(t.load_factor() >= 0.33);
        assert!(is_prime(t.capacity()));
    }
    let peak = t.capacity();
    for i in 0..2_000u64 {
        assert_eq!(t.remove(&(i * 7_919)), Ok(i));
        if !t.is_empty() {
            assert!(t.load_factor() >= 0.33, "{} / {}", t.len(), t.capacity());
        }
        assert!(is_prime(t.capacity()));
    }
    assert!(t.capacity() < peak);
    assert!(t.is_empty());
}

#[test]
fn get_and_remove_missing_keys() {
    let mut t: HashTable<String, String> = HashTable::new();
    assert_eq!(t.get("ghost"), Err(Error::KeyNotFound));
    assert_eq!(t.remove("ghost"), Err(Error::KeyNotFound));
    t.put("ghost".to_string(), "boo".to_string()).unwrap();
    assert_eq!(t.remove("ghost").as_deref(), Ok("boo"));
    assert!(!t.has_key("ghost"));
    assert_eq!(t.remove("ghost"), Err(Error::KeyNotFound));
}

#[test]
fn export_then_read_reconstructs_mapping() {
    let mut t: HashTable<String, String> = HashTable::with_capacity(1);
    let names = [
        ("u0001", "Alice Smith"),
        ("u0002", "Bob Jones"),
        ("u0003", "Carol White"),
        ("u0004", "Dan Brown"),
    ];
    for (k, v) in names {
        t.put(k.to_string(), v.to_string()).unwrap();
    }
    let text = t.export();
    assert!(text.ends_with('\n'));

    let back: HashTable<String, String> = HashTable::read(&text).unwrap();
    let a: BTreeMap<_, _> = t.iter().collect();
    let b: BTreeMap<_, _> = back.iter().collect();
    assert_eq!(a, b);

    // Removing from both drains them in lock step.
    let keys: Vec<String> = t.keys().cloned().collect();
    let mut back = back;
    for k in keys {
        assert_eq!(t.remove(k.as_str()), back.remove(k.as_str()));
    }
    assert!(back.is_empty());
}

#[test]
fn read_scalar_table_keeps_ints_and_strings_apart() {
    let t: HashTable<Scalar, Scalar> = HashTable::read("1,one\none,1\n1,uno\n").unwrap();
    assert_eq!(t.len(), 2);
    assert_eq!(t.get(&Scalar::Int(1)), Ok(&Scalar::from("one")));
    assert_eq!(t.get(&Scalar::from("one")), Ok(&Scalar::Int(1)));
}

/// Invariant: a table mixing numeric-looking strings, integers and floats
/// reads back with every key and value in its original variant.
#[test]
fn scalar_table_round_trips_through_export() {
    let mut t: HashTable<Scalar, Scalar> = HashTable::with_capacity(1);
    t.put(Scalar::from("1"), Scalar::from("x")).unwrap();
    t.put(Scalar::Int(1), Scalar::Float(2.0)).unwrap();
    t.put(Scalar::from("k"), Scalar::Float(2.5)).unwrap();
    t.put(Scalar::from("2.5"), Scalar::from("\"quoted\"")).unwrap();
    t.put(Scalar::Int(-3), Scalar::from("-3")).unwrap();

    let back: HashTable<Scalar, Scalar> = HashTable::read(&t.export()).unwrap();
    assert_eq!(back.len(), t.len());
    for (k, v) in &t {
        assert_eq!(back.get(k), Ok(v), "key {k:?}");
    }
    assert!(back.has_key(&Scalar::from("1")));
    assert_eq!(back.get(&Scalar::from("k")), Ok(&Scalar::Float(2.5)));
}

#[test]
fn unsupported_and_invalid_inputs() {
    let mut t: HashTable<Scalar, i32> = HashTable::new();
    assert_eq!(
        t.put(Scalar::Float(2.5), 1),
        Err(Error::UnsupportedKeyType("float"))
    );
    assert!(matches!(
        HashTable::<u8, u8>::with_config(4, TableConfig::default().with_max_load_factor(1.5)),
        Err(Error::InvalidConfiguration(_))
    ));
}
