//! Media and Movie documents: wire exports and safe projections.
//!
//! Run with `cargo run --example basic_objects`.

use chrono::{Datelike, Utc};

use docshield::schema::kinds::{NumberField, StringField, UuidField};
use docshield::{make_json_ownersafe, make_json_publicsafe, Document, SchemaBuilder, ShieldResult};

fn main() -> ShieldResult<()> {
    let media = SchemaBuilder::document("Media")
        .field("owner", UuidField::without_auto_fill())
        .field("title", StringField::new().max_length(40))
        .build()?;

    let mut m = Document::new(&media);
    m.set("title", "Misc Media")?;
    println!("From Media schema to json structure:\n\n    {}\n", m.to_json());

    let movie = SchemaBuilder::document("Movie")
        .extends(&media)
        .field(
            "year",
            NumberField::int()
                .min_value(1950)
                .max_value(Utc::now().year()),
        )
        .field("personal_thoughts", StringField::new().max_length(255))
        .public_fields(["title", "year"])
        .build()?;

    let mut mv = Document::new(&movie);
    mv.set("title", "Total Recall")?;
    mv.set("year", 1990)?;
    mv.set("personal_thoughts", "I wish I had three hands...")?;
    mv.validate()?;
    println!("From Movie schema to json structure:\n\n    {}\n", mv.to_json());

    println!(
        "Making mv json safe:\n\n    {}\n",
        make_json_ownersafe(&movie, &mv)
    );
    println!(
        "Making mv json public safe (only title and year should show):\n\n    {}\n",
        make_json_publicsafe(&movie, &mv)
    );

    Ok(())
}
