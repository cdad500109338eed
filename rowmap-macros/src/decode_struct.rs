use proc_macro2::Span;
use quote::ToTokens;
use syn::{
    Field, Fields, Ident, ItemStruct, LitStr, Result, Type,
    parse::{Parse, ParseBuffer},
};

pub(crate) struct MemberMetadata {
    pub(crate) ident: Ident,
    pub(crate) ty: Type,
    /// Store field name given with `#[mapped(name = "..")]`.
    pub(crate) mapped_name: Option<String>,
    pub(crate) read_only: bool,
    pub(crate) skip: bool,
}

pub(crate) struct ConstructorMetadata {
    pub(crate) ident: Ident,
    /// Indexes into `StructMetadata::members`.
    pub(crate) params: Vec<usize>,
}

pub(crate) struct StructMetadata {
    pub(crate) name: String,
    pub(crate) item: ItemStruct,
    pub(crate) members: Vec<MemberMetadata>,
    pub(crate) constructors: Vec<ConstructorMetadata>,
}

fn decode_member(field: &Field) -> MemberMetadata {
    let Some(ident) = field.ident.clone() else {
        panic!("Mapped can only be derived for structs with named fields");
    };
    let mut result = MemberMetadata {
        ident,
        ty: field.ty.clone(),
        mapped_name: None,
        read_only: false,
        skip: false,
    };
    for attr in &field.attrs {
        let meta = &attr.meta;
        if !meta.path().is_ident("mapped") {
            continue;
        }
        let Ok(list) = meta.require_list() else {
            panic!("Error while parsing `mapped`, use it like: `#[mapped(name = \"column\")]`");
        };
        let _ = list.parse_nested_meta(|arg| {
            if arg.path.is_ident("name") {
                let Ok(value) = arg.value().and_then(ParseBuffer::parse::<LitStr>) else {
                    panic!(
                        "Error while parsing `name`, use it like: `#[mapped(name = \"column\")]`"
                    );
                };
                result.mapped_name = Some(value.value());
            } else if arg.path.is_ident("read_only") {
                result.read_only = true;
            } else if arg.path.is_ident("skip") {
                result.skip = true;
            } else {
                panic!(
                    "Unknown attribute `{}` inside mapped field attribute",
                    arg.path.to_token_stream()
                );
            }
            Ok(())
        });
    }
    result
}

fn decode_constructor(
    members: &[MemberMetadata],
    arg: &syn::meta::ParseNestedMeta<'_>,
) -> Result<ConstructorMetadata> {
    let content;
    syn::parenthesized!(content in arg.input);
    let idents = content.parse_terminated(<Ident as Parse>::parse, syn::Token![,])?;
    let mut idents = idents.into_iter();
    let Some(ident) = idents.next() else {
        return Err(syn::Error::new(
            Span::call_site(),
            "A constructor needs a function name",
        ));
    };
    let params = idents
        .map(|param| {
            members
                .iter()
                .position(|m| m.ident == param)
                .ok_or_else(|| {
                    syn::Error::new(
                        param.span(),
                        format!("Parameter `{param}` does not name a field of the struct"),
                    )
                })
        })
        .collect::<Result<_>>()?;
    Ok(ConstructorMetadata { ident, params })
}

pub(crate) fn decode_struct(item: ItemStruct) -> StructMetadata {
    if !item.generics.params.is_empty() {
        panic!("Mapped cannot be derived for generic structs");
    }
    let Fields::Named(..) = &item.fields else {
        panic!("Mapped can only be derived for structs with named fields");
    };
    let members: Vec<_> = item.fields.iter().map(decode_member).collect();
    let mut name = item.ident.to_string();
    let mut constructors = Vec::new();
    for attr in &item.attrs {
        let meta = &attr.meta;
        if !meta.path().is_ident("mapped") {
            continue;
        }
        let Ok(list) = meta.require_list() else {
            panic!(
                "Error while parsing `mapped`, use it like: `#[mapped(attribute = value, ..)]`"
            );
        };
        if let Err(e) = list.parse_nested_meta(|arg| {
            if arg.path.is_ident("name") {
                let Ok(value) = arg.value().and_then(ParseBuffer::parse::<LitStr>) else {
                    panic!("Error while parsing `name`, use it like: `#[mapped(name = \"Order\")]`");
                };
                name = value.value();
            } else if arg.path.is_ident("constructor") {
                constructors.push(decode_constructor(&members, &arg)?);
            } else {
                panic!(
                    "Unknown attribute `{}` inside mapped macro",
                    arg.path.to_token_stream()
                );
            }
            Ok(())
        }) {
            panic!(
                "Error while parsing `mapped`: {e}, declare constructors like: `#[mapped(constructor(new, field_a, field_b))]`"
            );
        }
    }
    StructMetadata {
        name,
        item,
        members,
        constructors,
    }
}
