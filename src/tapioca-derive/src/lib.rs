mod attrs;
mod impls;

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use syn::Result as SynResult;

/// Implements `tapioca::reflect::Injectable` for the self type of an
/// inherent `impl` block.
///
/// - `#[inject]` marks the constructor, returning `Self` or `Result<Self, E>`.
/// - `#[callable]` marks a method taking `&self` or no receiver, so that it
///   can be called through `Container::tap`.
/// - `#[default(expr)]` gives a parameter which is not an `Arc` a default
///   value.
///
/// The attribute itself accepts `singleton`, `implements(dyn A, ...)` and
/// `name = "..."`.
#[proc_macro_attribute]
pub fn injectable(attr: TokenStream, item: TokenStream) -> TokenStream {
    match injectable_impl(attr, item) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.into_compile_error().into(),
    }
}

fn injectable_impl(attr: TokenStream, item: TokenStream) -> SynResult<TokenStream2> {
    let attr_data = attrs::parse_attributes(attr)?;
    let expanded = impls::expand_implementation(item, attr_data)?;
    Ok(expanded)
}
