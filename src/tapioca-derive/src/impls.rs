use proc_macro::TokenStream;
use proc_macro2::{Span, TokenStream as TokenStream2};
use quote::{format_ident, quote};
use syn::spanned::Spanned;
use syn::visit_mut::{self, VisitMut};
use syn::{
    Attribute, Error as SynError, Expr, FnArg, GenericArgument, Ident, ImplItem, ImplItemFn,
    ItemImpl, LitStr, Meta, Pat, PathArguments, Result as SynResult, ReturnType, Signature, Type,
    TypePath,
};

use crate::attrs::AttributeData;

struct ConstructorData {
    identifier: Ident,
    arguments: Vec<ArgumentData>,
    fallible: bool,
}

struct MethodData {
    identifier: Ident,
    receiver: bool,
    arguments: Vec<ArgumentData>,
    fallible: bool,
}

struct ArgumentData {
    span: Span,
    name: String,
    ty: Type,
    kind: ArgumentKind,
}

enum ArgumentKind {
    Typed(Type),
    Untyped { default: Option<Expr> },
}

struct AttributeRemovalVisitor;

impl AttributeRemovalVisitor {
    fn is_custom_attribute(attr: &Attribute) -> bool {
        match &attr.meta {
            Meta::Path(path) => path.is_ident("inject") || path.is_ident("callable"),
            Meta::List(list) => list.path.is_ident("default"),
            Meta::NameValue(_) => false,
        }
    }
}

impl VisitMut for AttributeRemovalVisitor {
    fn visit_attributes_mut(&mut self, attrs: &mut Vec<Attribute>) {
        attrs.retain(|attr| !Self::is_custom_attribute(attr));
        attrs
            .iter_mut()
            .for_each(|attr| visit_mut::visit_attribute_mut(self, attr));
    }
}

pub fn expand_implementation(
    impls: TokenStream,
    attr_data: AttributeData,
) -> SynResult<TokenStream2> {
    let mut impls = match syn::parse::<ItemImpl>(impls) {
        Ok(impls) => impls,
        Err(err) => {
            return Err(SynError::new(
                err.span(),
                "`#[injectable]` should be annotated on the `impl` block",
            ))
        }
    };
    if let Some((_, path, _)) = &impls.trait_ {
        return Err(SynError::new(
            path.span(),
            "`#[injectable]` should be annotated on an inherent `impl` block",
        ));
    }

    let self_type = get_self_type(&impls)?;
    let self_ident = get_self_ident(&self_type)?;
    let constructor = get_constructor(&impls.items, &self_ident)?;
    let methods = get_methods(&impls.items)?;

    let expanded = expand_injectable_implementation(
        &impls,
        &self_type,
        constructor.as_ref(),
        &methods,
        attr_data,
    )?;

    let mut visitor = AttributeRemovalVisitor;
    visitor.visit_item_impl_mut(&mut impls);

    Ok(quote! {
        #impls
        #expanded
    })
}

fn get_self_type(impls: &ItemImpl) -> SynResult<TypePath> {
    if let Type::Path(ty) = impls.self_ty.as_ref() {
        Ok(ty.clone())
    } else {
        Err(SynError::new(impls.self_ty.span(), "invalid self type"))
    }
}

fn get_self_ident(self_type: &TypePath) -> SynResult<Ident> {
    match self_type.path.segments.last() {
        Some(last) => Ok(last.ident.clone()),
        None => Err(SynError::new(self_type.span(), "invalid self type")),
    }
}

fn filter_and_map_item_fn(item: &ImplItem) -> Option<&ImplItemFn> {
    if let ImplItem::Fn(impl_fn) = item {
        Some(impl_fn)
    } else {
        None
    }
}

fn is_annotated_with(item_fn: &ImplItemFn, name: &str) -> bool {
    item_fn
        .attrs
        .iter()
        .any(|attr| matches!(&attr.meta, Meta::Path(path) if path.is_ident(name)))
}

fn get_constructor(items: &[ImplItem], self_ident: &Ident) -> SynResult<Option<ConstructorData>> {
    let ctors: Vec<_> = items
        .iter()
        .filter_map(filter_and_map_item_fn)
        .filter(|item_fn| is_annotated_with(item_fn, "inject"))
        .collect();

    let signature = match ctors.as_slice() {
        [] => return Ok(None),
        [ctor] => &ctor.sig,
        [_, other, ..] => {
            return Err(SynError::new(
                other.sig.ident.span(),
                "only one associated function can be annotated with `#[inject]`",
            ))
        }
    };

    if let Some(FnArg::Receiver(rec)) = signature.inputs.first() {
        return Err(SynError::new(
            rec.self_token.span,
            "method is not allowed to be annotated with `#[inject]`",
        ));
    }
    if is_annotated_with(ctors[0], "callable") {
        return Err(SynError::new(
            signature.ident.span(),
            "a constructor is not allowed to be annotated with `#[callable]`",
        ));
    }

    let fallible = parse_constructor_return_type(&signature.output, self_ident)?;
    Ok(Some(ConstructorData {
        identifier: signature.ident.clone(),
        arguments: parse_arguments(signature)?,
        fallible,
    }))
}

fn get_methods(items: &[ImplItem]) -> SynResult<Vec<MethodData>> {
    items
        .iter()
        .filter_map(filter_and_map_item_fn)
        .filter(|item_fn| is_annotated_with(item_fn, "callable"))
        .map(|item_fn| parse_method(&item_fn.sig))
        .collect()
}

fn parse_method(signature: &Signature) -> SynResult<MethodData> {
    let receiver = match signature.inputs.first() {
        Some(FnArg::Receiver(rec)) if rec.reference.is_some() && rec.mutability.is_none() => true,
        Some(FnArg::Receiver(rec)) => {
            return Err(SynError::new(
                rec.self_token.span,
                "a `#[callable]` method should take `&self` or no receiver",
            ))
        }
        _ => false,
    };
    if !signature.generics.params.is_empty() {
        return Err(SynError::new(
            signature.ident.span(),
            "a `#[callable]` method is not allowed to be generic",
        ));
    }

    Ok(MethodData {
        identifier: signature.ident.clone(),
        receiver,
        arguments: parse_arguments(signature)?,
        fallible: is_result_type(&signature.output),
    })
}

fn parse_arguments(signature: &Signature) -> SynResult<Vec<ArgumentData>> {
    signature
        .inputs
        .iter()
        .filter_map(|arg| match arg {
            FnArg::Typed(arg) => Some(arg),
            FnArg::Receiver(_) => None,
        })
        .enumerate()
        .map(|(i, arg)| {
            let name = match arg.pat.as_ref() {
                Pat::Ident(pat) => pat.ident.to_string().trim_start_matches('_').to_owned(),
                _ => format!("#{i}"),
            };
            let ty = arg.ty.as_ref().clone();
            let default = parse_default_attribute(&arg.attrs)?;

            let kind = match (get_arc_target(&ty), default) {
                (Some(_), Some(default)) => {
                    return Err(SynError::new(
                        default.span(),
                        "an `Arc<T>` parameter is resolved from the container and can't have a default value",
                    ))
                }
                (Some(target), None) => ArgumentKind::Typed(target),
                (None, default) => ArgumentKind::Untyped { default },
            };

            Ok(ArgumentData {
                span: arg.span(),
                name,
                ty,
                kind,
            })
        })
        .collect()
}

fn parse_default_attribute(attrs: &[Attribute]) -> SynResult<Option<Expr>> {
    let mut res = None;
    for attr in attrs.iter().filter(|attr| attr.path().is_ident("default")) {
        let Meta::List(_) = &attr.meta else {
            return Err(SynError::new(
                attr.span(),
                "expects `#[default(...)]` to receive an expression",
            ));
        };
        if res.is_some() {
            return Err(SynError::new(
                attr.span(),
                "only one `#[default(...)]` attribute is allowed",
            ));
        }
        res = Some(attr.parse_args::<Expr>()?);
    }
    Ok(res)
}

/// Returns `T` if `ty` is spelled `Arc<T>`, `sync::Arc<T>` or
/// `std::sync::Arc<T>`.
fn get_arc_target(ty: &Type) -> Option<Type> {
    let Type::Path(TypePath { qself: None, path }) = ty else {
        return None;
    };
    let last = path.segments.last()?;
    if last.ident != "Arc" {
        return None;
    }
    let PathArguments::AngleBracketed(arguments) = &last.arguments else {
        return None;
    };
    match arguments.args.iter().collect::<Vec<_>>().as_slice() {
        [GenericArgument::Type(target)] => Some(target.clone()),
        _ => None,
    }
}

/// Returns `T` if `ty` is spelled `Result<T, E>`.
fn get_result_ok_type(ty: &Type) -> Option<&Type> {
    let Type::Path(TypePath { qself: None, path }) = ty else {
        return None;
    };
    let last = path.segments.last()?;
    if last.ident != "Result" {
        return None;
    }
    let PathArguments::AngleBracketed(arguments) = &last.arguments else {
        return None;
    };
    match arguments.args.iter().collect::<Vec<_>>().as_slice() {
        [GenericArgument::Type(ok), _] => Some(ok),
        _ => None,
    }
}

fn is_result_type(output: &ReturnType) -> bool {
    match output {
        ReturnType::Type(_, ty) => get_result_ok_type(ty).is_some(),
        ReturnType::Default => false,
    }
}

/// Returns whether `ty` is `Self` or a path ending in the self type's name.
fn names_self_type(ty: &Type, self_ident: &Ident) -> bool {
    let Type::Path(TypePath { qself: None, path }) = ty else {
        return false;
    };
    path.segments
        .last()
        .is_some_and(|last| last.ident == "Self" || last.ident == *self_ident)
}

/// Returns whether the constructor returns `Result<Self, E>` rather than
/// `Self`.
fn parse_constructor_return_type(output: &ReturnType, self_ident: &Ident) -> SynResult<bool> {
    const MESSAGE: &str = "a constructor's return type should be `Self` or `Result<Self, E>`";

    let ReturnType::Type(_, ty) = output else {
        return Err(SynError::new(output.span(), MESSAGE));
    };
    let (target, fallible) = match get_result_ok_type(ty) {
        Some(ok) => (ok, true),
        None => (ty.as_ref(), false),
    };
    if names_self_type(target, self_ident) {
        Ok(fallible)
    } else {
        Err(SynError::new(target.span(), MESSAGE))
    }
}

fn expand_parameters(arguments: &[ArgumentData]) -> TokenStream2 {
    let parameters = arguments.iter().map(|arg| {
        let name = LitStr::new(&arg.name, arg.span);
        let ty = &arg.ty;
        match &arg.kind {
            ArgumentKind::Typed(target) => {
                quote! { tapioca::reflect::Parameter::typed::<#target>(#name) }
            }
            ArgumentKind::Untyped { default: None } => {
                quote! { tapioca::reflect::Parameter::untyped::<#ty>(#name) }
            }
            ArgumentKind::Untyped {
                default: Some(default),
            } => {
                quote! { tapioca::reflect::Parameter::optional::<#ty>(#name, || #default) }
            }
        }
    });
    quote! { vec![#(#parameters),*] }
}

struct TakeStatements {
    /// The closure parameter holding the resolved arguments.
    source: Ident,
    statements: TokenStream2,
    args: TokenStream2,
}

fn expand_take_statements(arguments: &[ArgumentData]) -> TakeStatements {
    let source = if arguments.is_empty() {
        format_ident!("_arguments")
    } else {
        format_ident!("arguments")
    };
    let idents: Vec<_> = (0..arguments.len())
        .map(|i| format_ident!("arg{i}"))
        .collect();
    let statements = arguments.iter().zip(&idents).map(|(arg, ident)| {
        let ty = &arg.ty;
        quote! { let #ident = #source.take::<#ty>()?; }
    });
    let statements = quote! { #(#statements)* };

    TakeStatements {
        source,
        statements,
        args: quote! { #(#idents),* },
    }
}

/// Pins the constructed value to `Self`, so that a constructor returning
/// another type fails to compile.
fn expand_constructor_result(call: TokenStream2, fallible: bool) -> TokenStream2 {
    if fallible {
        quote! {
            ::std::result::Result::<Self, _>::map_err(#call, ::std::convert::Into::into)
        }
    } else {
        quote! { ::std::result::Result::<Self, tapioca::reflect::BoxError>::Ok(#call) }
    }
}

fn expand_result(call: TokenStream2, fallible: bool) -> TokenStream2 {
    if fallible {
        quote! { #call.map_err(::std::convert::Into::into) }
    } else {
        quote! { Ok(#call) }
    }
}

fn expand_injectable_implementation(
    impls: &ItemImpl,
    self_type: &TypePath,
    constructor: Option<&ConstructorData>,
    methods: &[MethodData],
    attr_data: AttributeData,
) -> SynResult<TokenStream2> {
    let name = match attr_data.name {
        Some(name) => name,
        None => {
            let Some(last) = self_type.path.segments.last() else {
                return Err(SynError::new(self_type.span(), "invalid self type"));
            };
            LitStr::new(&last.ident.to_string(), last.ident.span())
        }
    };

    let lifetime = if attr_data.singleton {
        quote! { tapioca::reflect::Lifetime::Singleton }
    } else {
        quote! { tapioca::reflect::Lifetime::Transient }
    };

    let with_constructor = constructor.map(|ctor| {
        let identifier = &ctor.identifier;
        let parameters = expand_parameters(&ctor.arguments);
        let TakeStatements {
            source,
            statements,
            args,
        } = expand_take_statements(&ctor.arguments);
        let build = expand_constructor_result(quote! { Self::#identifier(#args) }, ctor.fallible);
        quote! {
            .with_constructor(tapioca::reflect::Constructor::new(
                #parameters,
                |#source: &mut tapioca::reflect::ResolvedArguments| {
                    #statements
                    #build
                },
            ))
        }
    });

    let implements = attr_data.interfaces.iter().map(|interface| {
        quote! {
            .implements(tapioca::reflect::Interface::new::<Self, #interface>(|this| this))
        }
    });

    let with_methods = methods.iter().map(|method| {
        let identifier = &method.identifier;
        let method_name = LitStr::new(&identifier.to_string(), identifier.span());
        let parameters = expand_parameters(&method.arguments);
        let TakeStatements {
            source,
            statements,
            args,
        } = expand_take_statements(&method.arguments);
        if method.receiver {
            let call = expand_result(quote! { this.#identifier(#args) }, method.fallible);
            quote! {
                .with_method(tapioca::reflect::Method::instance(
                    #method_name,
                    #parameters,
                    |this: &Self, #source: &mut tapioca::reflect::ResolvedArguments| {
                        #statements
                        #call
                    },
                ))
            }
        } else {
            let call = expand_result(quote! { Self::#identifier(#args) }, method.fallible);
            quote! {
                .with_method(tapioca::reflect::Method::associated(
                    #method_name,
                    #parameters,
                    |#source: &mut tapioca::reflect::ResolvedArguments| {
                        #statements
                        #call
                    },
                ))
            }
        }
    });

    let (impl_generics, _, where_clause) = impls.generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics tapioca::reflect::Injectable for #self_type #where_clause {
            fn describe() -> tapioca::reflect::TypeDescriptor {
                tapioca::reflect::TypeDescriptor::new::<Self>(#name)
                    .with_lifetime(#lifetime)
                    #with_constructor
                    #(#implements)*
                    #(#with_methods)*
            }
        }
    })
}
