use crate::decode_struct::StructMetadata;
use proc_macro2::TokenStream;
use quote::quote;

/// The no-argument constructor of a struct implementing `Default`.
///
/// Resolved through the inherent method of the factory when `T: Default`,
/// through the trait method returning `None` otherwise.
fn default_constructor(metadata: &StructMetadata) -> TokenStream {
    let struct_name = &metadata.item.ident;
    quote! {
        #[allow(dead_code)]
        trait __NoDefaultConstructor {
            fn default_constructor() -> Option<::rowmap::ConstructorDef<#struct_name>> {
                None
            }
        }
        struct __ConstructorFactory<T>(::std::marker::PhantomData<T>);
        impl<T: Default + Into<#struct_name>> __ConstructorFactory<T> {
            #[allow(dead_code)]
            fn default_constructor() -> Option<::rowmap::ConstructorDef<#struct_name>> {
                Some(::rowmap::ConstructorDef::new(
                    "default",
                    Vec::new(),
                    |_| Ok(T::default().into()),
                ))
            }
        }
        impl<T> __NoDefaultConstructor for __ConstructorFactory<T> {}
    }
}

pub(crate) fn type_def_trait(metadata: &StructMetadata) -> TokenStream {
    let struct_name = &metadata.item.ident;
    let name = &metadata.name;
    let default_constructor = default_constructor(metadata);
    let constructors = metadata.constructors.iter().map(|c| {
        let ident = &c.ident;
        let constructor_name = ident.to_string();
        let params = c.params.iter().map(|i| {
            let member = &metadata.members[*i];
            let param_name = member.ident.to_string();
            let ty = &member.ty;
            quote!(::rowmap::ParamDef::of::<#ty>(#param_name))
        });
        let args = c.params.iter().enumerate().map(|(position, i)| {
            let ty = &metadata.members[*i].ty;
            quote!(__args__.take::<#ty>(#position)?)
        });
        quote! {
            def = def.constructor(::rowmap::ConstructorDef::new(
                #constructor_name,
                vec![#(#params),*],
                |__args__| Ok(#struct_name::#ident(#(#args),*)),
            ));
        }
    });
    let members = metadata.members.iter().filter(|m| !m.skip).map(|m| {
        let ident = &m.ident;
        let member_name = ident.to_string();
        let ty = &m.ty;
        let mapped = m
            .mapped_name
            .as_ref()
            .map(|v| quote!(.mapped(#v)))
            .unwrap_or_default();
        let setter = if m.read_only {
            TokenStream::new()
        } else {
            quote! {
                .with_setter(|__entity__: &mut #struct_name, __value__: ::rowmap::Value| {
                    __entity__.#ident = <#ty as ::rowmap::AsValue>::try_from_value(__value__)?;
                    Ok(())
                })
            }
        };
        quote! {
            def = def.member(
                ::rowmap::MemberDef::new::<#ty>(#member_name, |__entity__: &#struct_name| {
                    ::rowmap::AsValue::as_value(::std::clone::Clone::clone(&__entity__.#ident))
                })
                #mapped
                #setter
            );
        }
    });
    quote! {
        impl ::rowmap::Mapped for #struct_name {
            fn type_def() -> ::rowmap::TypeDef<Self> {
                #default_constructor
                let mut def = ::rowmap::EntityDef::<#struct_name>::new(#name);
                if let Some(constructor) = __ConstructorFactory::<#struct_name>::default_constructor() {
                    def = def.constructor(constructor);
                }
                #(#constructors)*
                #(#members)*
                ::rowmap::TypeDef::Entity(def)
            }
        }
    }
}
