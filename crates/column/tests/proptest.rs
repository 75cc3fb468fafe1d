//! Property-based tests for memcol-column using proptest.
//!
//! Point lookups and block materialization must agree with each other and with
//! a naive model that replays every delta in version order.

use memcol_column::{Column, ColumnBlock, ColumnBlockHolder, ColumnDeltaBuilder, TypedColumnReader};
use memcol_core::row_id::make_row_id;
use memcol_core::schema::ColumnSchema;
use memcol_core::ColumnType;
use proptest::prelude::*;

type Blocks = Vec<Vec<Option<i32>>>;
type Updates = Vec<Vec<(usize, usize, Option<i32>)>>;

fn base_strategy() -> impl Strategy<Value = Blocks> {
    prop::collection::vec(
        prop::collection::vec(prop::option::of(any::<i32>()), 1..64),
        1..4,
    )
}

fn updates_strategy() -> impl Strategy<Value = Updates> {
    prop::collection::vec(
        prop::collection::vec(
            (any::<usize>(), any::<usize>(), prop::option::of(any::<i32>())),
            0..24,
        ),
        0..6,
    )
}

/// Builds a column with one delta per update batch, at versions 1, 2, ...
/// Returns the column and the expected state after each version.
fn build(base: &Blocks, updates: &Updates, nullable: bool) -> (Column, Vec<Blocks>) {
    let schema = ColumnSchema::new(2, "v", ColumnType::Int).nullable(nullable);
    let mut column = Column::new(schema, 0);
    let mut state: Blocks = base
        .iter()
        .map(|rows| {
            rows.iter()
                .map(|v| if nullable { *v } else { Some(v.unwrap_or(0)) })
                .collect()
        })
        .collect();

    for rows in &state {
        let values: Vec<i32> = rows.iter().map(|v| v.unwrap_or(0)).collect();
        let mut block = ColumnBlock::from_values(&values).unwrap();
        for (i, v) in rows.iter().enumerate() {
            if v.is_none() {
                block.set_null(i as u32).unwrap();
            }
        }
        column.add_block(block).unwrap();
    }

    let mut history = vec![state.clone()];
    for (i, batch) in updates.iter().enumerate() {
        let mut builder = ColumnDeltaBuilder::<i32>::new(column.schema());
        for &(b, o, value) in batch {
            let bid = b % state.len();
            let offset = o % state[bid].len();
            let value = if nullable { value } else { Some(value.unwrap_or(0)) };
            builder
                .update(make_row_id(bid as u32, offset as u32), value)
                .unwrap();
            state[bid][offset] = value;
        }
        column.add_delta(builder.build(i as u64 + 1).unwrap()).unwrap();
        history.push(state.clone());
    }
    (column, history)
}

fn check_nullable(column: &Column, version: u64, expected: &Blocks) -> Result<(), TestCaseError> {
    let reader: TypedColumnReader<i32, true> = column.create_reader(version).unwrap();
    let mut holder = ColumnBlockHolder::new();
    for (bid, rows) in expected.iter().enumerate() {
        let bid = bid as u32;
        reader.get_block(rows.len(), bid, &mut holder).unwrap();
        let block = holder.get().unwrap();
        for (offset, want) in rows.iter().enumerate() {
            let got = reader.get(make_row_id(bid, offset as u32)).copied();
            prop_assert_eq!(got, *want, "get v{} block {} row {}", version, bid, offset);
            prop_assert_eq!(
                block.value::<i32>(offset as u32),
                *want,
                "get_block v{} block {} row {}",
                version,
                bid,
                offset
            );
        }
    }
    Ok(())
}

proptest! {
    /// `get` and `get_block` agree with replaying deltas in version order.
    #[test]
    fn nullable_get_matches_get_block(base in base_strategy(), updates in updates_strategy()) {
        let (column, history) = build(&base, &updates, true);
        for (version, expected) in history.iter().enumerate() {
            check_nullable(&column, version as u64, expected)?;
        }
    }

    /// Same property for a non-nullable column.
    #[test]
    fn non_nullable_get_matches_get_block(base in base_strategy(), updates in updates_strategy()) {
        let (column, history) = build(&base, &updates, false);
        for (version, expected) in history.iter().enumerate() {
            let reader: TypedColumnReader<i32> = column.create_reader(version as u64).unwrap();
            let mut holder = ColumnBlockHolder::new();
            for (bid, rows) in expected.iter().enumerate() {
                let bid = bid as u32;
                reader.get_block(rows.len(), bid, &mut holder).unwrap();
                let data = holder.get().unwrap().data().as_slice::<i32>();
                for (offset, want) in rows.iter().enumerate() {
                    let want = want.unwrap();
                    prop_assert_eq!(reader.get(make_row_id(bid, offset as u32)), Some(&want));
                    prop_assert_eq!(data[offset], want);
                }
            }
        }
    }

    /// Blocks no visible delta touches are shared, never copied.
    #[test]
    fn untouched_blocks_are_shared(base in base_strategy(), updates in updates_strategy()) {
        let (column, _) = build(&base, &updates, true);
        let reader: TypedColumnReader<i32, true> = column.create_reader(column.version()).unwrap();
        for (bid, block) in column.blocks().iter().enumerate() {
            let touched = column.deltas().iter().any(|d| d.contains_block(bid as u32));
            let mut holder = ColumnBlockHolder::new();
            reader.get_block(block.size(), bid as u32, &mut holder).unwrap();
            prop_assert_eq!(holder.shares(block), !touched);
        }
    }

    /// Equal keys hash equally and equality follows the visible value.
    #[test]
    fn key_hash_and_equals(values in prop::collection::vec(any::<i64>(), 1..64), pick in any::<usize>()) {
        let schema = ColumnSchema::new(1, "id", ColumnType::BigInt).key(true);
        let mut column = Column::new(schema, 0);
        column.add_block(ColumnBlock::from_values(&values).unwrap()).unwrap();
        let reader: TypedColumnReader<i64> = column.create_reader(0).unwrap();

        let rid = pick % values.len();
        let key = [values[rid]];
        prop_assert!(reader.equals(rid as u32, &key, 0));
        prop_assert_eq!(reader.hashcode(&key, 0), reader.hashcode(&[values[rid]], 0));
    }
}
