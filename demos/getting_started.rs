use geotable::prelude::*;
use geotable::records_to_geojson;
use std::sync::Arc;

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    println!("=== geotable - Getting Started ===\n");

    // Settings come from GEOTABLE_* variables when present
    let config = Config::from_env()?;
    let table = GeoTable::builder(Arc::new(MemoryBackend::new()))
        .config(config)
        .partition_bits(6)
        .build()?;
    table.create_table().await?;
    println!("✓ Created table {:?}\n", table.table_name());

    println!("1. Storing points");
    println!("-----------------");
    let places = vec![
        ("nyc:pizza", "Joe's Pizza", GeoPoint::new(40.7306, -73.9891)),
        ("nyc:bagels", "Ess-a-Bagel", GeoPoint::new(40.7517, -73.9712)),
        ("nyc:museum", "The Met", GeoPoint::new(40.7794, -73.9632)),
        ("nyc:bridge", "Brooklyn Bridge", GeoPoint::new(40.7061, -73.9969)),
        ("ldn:tower", "Tower of London", GeoPoint::new(51.5081, -0.0759)),
    ];
    let records: Vec<Record> = places
        .into_iter()
        .map(|(id, name, point)| Record::new(id, point).with_attribute("name", name))
        .collect();
    table.put_points(records).await?;
    println!("   Stored {} places\n", table.backend().stats().row_count);

    println!("2. Radius query");
    println!("---------------");
    let union_square = GeoPoint::new(40.7359, -73.9911);
    let request = QueryRadiusRequest::new(union_square, 3_000.0).with_attributes_to_get(["name"]);
    let found = table.query_radius(&request).await?;
    for (record, distance) in sort_by_distance(found.clone(), &union_square) {
        println!("   {:<12} {:>7.0} m  {}", record.identifier, distance, record.attributes["name"]);
    }
    println!();

    println!("3. Rectangle query");
    println!("------------------");
    let midtown = QueryRectangleRequest::new(GeoPoint::new(40.74, -74.00), GeoPoint::new(40.80, -73.95));
    let found_box = table.query_rectangle(&midtown).await?;
    println!("   {} places in midtown\n", found_box.len());

    println!("4. Moving and deleting");
    println!("----------------------");
    table
        .put_point(Record::new("nyc:pizza", GeoPoint::new(51.5155, -0.1419)).with_attribute("name", "Joe's Pizza London"))
        .await?;
    let after_move = table.query_radius(&request).await?;
    println!("   After move: {} places near Union Square", after_move.len());
    table.delete_point("nyc:bridge").await?;
    let after_delete = table.query_radius(&request).await?;
    println!("   After delete: {} places near Union Square\n", after_delete.len());

    println!("5. GeoJSON export");
    println!("-----------------");
    println!("   {}\n", records_to_geojson(&after_delete)?);

    let stats = table.backend().stats();
    println!(
        "Stats: {} rows in {} partitions, {} backend operations",
        stats.row_count, stats.partition_count, stats.operations_count
    );
    Ok(())
}
