//! Procedural macro that expands a JSON Type Definition schema into Rust
//! types at compile time.
//!
//! ```ignore
//! jtd_codegen_macro::jtd_to_rust!(root_name = "user", r#"{
//!     "properties": { "name": { "type": "string" } }
//! }"#);
//! ```
//!
//! The generated items derive `serde::Serialize` and `serde::Deserialize`
//! and refer to `serde` (and `serde_json` or `chrono` when the schema needs
//! them) by path, so the calling crate must depend on those crates.

use jtd_codegen::{DEFAULT_ROOT_NAME, generate_rust_items};
use proc_macro::TokenStream;
use proc_macro2::{Span, TokenStream as TokenStream2};
use syn::parse::{Parse, ParseStream};
use syn::{Ident, LitStr, Token, parse_macro_input};

const ROOT_NAME_KEY: &str = "root_name";

struct JtdToRustInput {
    root_name: Option<LitStr>,
    schema: LitStr,
}

impl Parse for JtdToRustInput {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let mut root_name: Option<LitStr> = None;
        if input.peek(Ident) {
            let key: Ident = input.parse()?;
            if key != ROOT_NAME_KEY {
                return Err(syn::Error::new(
                    key.span(),
                    format!("unknown option `{key}`, expected `{ROOT_NAME_KEY}`"),
                ));
            }
            input.parse::<Token![=]>()?;
            root_name = Some(input.parse()?);
            input.parse::<Token![,]>()?;
        }
        let schema: LitStr = input.parse()?;
        if input.peek(Token![,]) {
            input.parse::<Token![,]>()?;
        }
        Ok(Self { root_name, schema })
    }
}

/// Generates Rust types from a JTD schema string literal.
///
/// Accepts `jtd_to_rust!(r#"{...}"#)` or
/// `jtd_to_rust!(root_name = "User", r#"{...}"#)`. The root type is named
/// `Root` unless `root_name` is given. An invalid schema is a compile error
/// pointing at the literal.
#[proc_macro]
pub fn jtd_to_rust(input: TokenStream) -> TokenStream {
    let input: JtdToRustInput = parse_macro_input!(input as JtdToRustInput);
    expand(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn expand(input: &JtdToRustInput) -> syn::Result<TokenStream2> {
    let root_name: String = input
        .root_name
        .as_ref()
        .map_or_else(|| DEFAULT_ROOT_NAME.to_string(), LitStr::value);
    let span: Span = input.schema.span();
    let items: String = generate_rust_items(&input.schema.value(), &root_name)
        .map_err(|error| syn::Error::new(span, error.to_string()))?;
    items
        .parse::<TokenStream2>()
        .map_err(|error| syn::Error::new(span, format!("generated code did not tokenize: {error}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_schema_only() {
        let input: JtdToRustInput = syn::parse_str(r#"r"{}""#).expect("parsed");
        assert!(input.root_name.is_none());
        assert_eq!(input.schema.value(), "{}");
    }

    #[test]
    fn parses_root_name_and_trailing_comma() {
        let input: JtdToRustInput =
            syn::parse_str(r#"root_name = "user", "{}","#).expect("parsed");
        assert_eq!(input.root_name.as_ref().map(LitStr::value), Some("user".to_string()));
    }

    #[test]
    fn rejects_unknown_option() {
        let error = syn::parse_str::<JtdToRustInput>(r#"name = "user", "{}""#)
            .err()
            .expect("unknown option");
        assert_eq!(error.to_string(), "unknown option `name`, expected `root_name`");
    }

    #[test]
    fn invalid_schema_becomes_error() {
        let input: JtdToRustInput = syn::parse_str(r#""{ \"type\": \"int64\" }""#).expect("parsed");
        let error = expand(&input).expect_err("int64 is not a JTD type");
        assert_eq!(
            error.to_string(),
            "invalid schema at #/type: unknown type `int64`"
        );
    }

    #[test]
    fn expands_to_items() {
        let input: JtdToRustInput =
            syn::parse_str(r#""{ \"properties\": { \"id\": { \"type\": \"string\" } } }""#)
                .expect("parsed");
        let tokens: String = expand(&input).expect("expanded").to_string();
        assert!(tokens.contains("pub struct Root"), "{tokens}");
    }
}
