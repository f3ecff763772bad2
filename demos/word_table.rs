use nn_hashtable::{Error, NnHashTable, TableBuilder};
use tracing_subscriber::EnvFilter;

// Run with `RUST_LOG=nn_hashtable=debug` to see every retrain.
fn main() -> nn_hashtable::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let keys = ["012", "ABC", "XwdYZ", "gddog", "emu", "xyz", "asd", "4fw"];
    let values = ["the", "long", "brown", "jumped", "over", "the", "tall", "red"];

    // 20-character keys, 10 slots, keys map straight onto slots.
    let mut table: NnHashTable<&str> = TableBuilder::new(20, 10)?.build_with_seed(0)?;
    for (key, value) in keys.iter().zip(values) {
        table.put(key, value)?;
        println!("put {key:?} -> slot {}", table.hash(key)?);
    }

    for key in keys {
        println!("get {key:?} = {:?}", table.get(key)?);
    }

    match table.get("nope") {
        Err(Error::KeyNotFound { key, slot }) => {
            println!("get {key:?}: no match at candidate slot {slot}")
        }
        other => println!("get \"nope\": {other:?}"),
    }

    let removed = table.delete("ABC")?;
    println!("deleted \"ABC\" ({removed:?}), {} records left", table.total_records());
    for (slot, (key, value)) in table.iter().enumerate() {
        println!("  {slot}: {key:?} = {value:?}");
    }

    Ok(())
}
