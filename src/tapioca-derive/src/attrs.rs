use proc_macro::TokenStream;
use syn::parse::Parser;
use syn::punctuated::Punctuated;
use syn::token::Comma;
use syn::{parenthesized, LitStr, Result as SynResult, Type};

#[derive(Default)]
pub struct AttributeData {
    pub singleton: bool,
    pub interfaces: Vec<Type>,
    pub name: Option<LitStr>,
}

pub fn parse_attributes(attr: TokenStream) -> SynResult<AttributeData> {
    let mut data = AttributeData::default();
    if attr.is_empty() {
        return Ok(data);
    }

    let parser = syn::meta::parser(|meta| {
        if meta.path.is_ident("singleton") {
            data.singleton = true;
            Ok(())
        } else if meta.path.is_ident("implements") {
            let content;
            parenthesized!(content in meta.input);
            let interfaces = Punctuated::<Type, Comma>::parse_terminated(&content)?;
            data.interfaces.extend(interfaces);
            Ok(())
        } else if meta.path.is_ident("name") {
            data.name = Some(meta.value()?.parse()?);
            Ok(())
        } else {
            Err(meta.error("expects `singleton`, `implements(...)` or `name = \"...\"`"))
        }
    });
    parser.parse(attr)?;

    Ok(data)
}
