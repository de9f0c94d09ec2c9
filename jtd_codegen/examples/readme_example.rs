//! Full-featured example matching the README: every JTD form in one schema.
//! See [README Examples](../../README.md#examples).
//!
//! Contains only the input schema and the conversion logic; generated Rust is
//! written to stdout.

use std::io;

const SCHEMA_JSON: &str = r#"{
  "metadata": { "description": "An order placed by a customer." },
  "definitions": {
    "address": {
      "properties": {
        "street": { "type": "string" },
        "city": { "type": "string" }
      },
      "optionalProperties": {
        "postcode": { "type": "string", "nullable": true }
      }
    }
  },
  "properties": {
    "id": { "type": "string", "metadata": { "description": "Unique identifier." } },
    "placedAt": { "type": "timestamp" },
    "quantity": { "type": "uint16" },
    "shipTo": { "ref": "address" },
    "status": {
      "enum": ["pending", "in-transit", "delivered"],
      "metadata": { "enumDescription": { "in-transit": "Handed to the carrier." } }
    },
    "payment": {
      "discriminator": "method",
      "mapping": {
        "card": { "properties": { "last4": { "type": "string" } } },
        "invoice": { "properties": { "dueDays": { "type": "uint8" } } }
      }
    },
    "tags": { "elements": { "type": "string" } },
    "attributes": { "values": { "type": "string" } }
  },
  "optionalProperties": {
    "note": {},
    "type": { "type": "string" }
  },
  "additionalProperties": true
}"#;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut stdout: io::Stdout = io::stdout();
    jtd_codegen::generate_rust_to_writer(SCHEMA_JSON, "order", &mut stdout)?;
    Ok(())
}
