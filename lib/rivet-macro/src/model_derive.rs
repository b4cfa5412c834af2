//! `#[derive(Model)]` and `#[derive(Identified)]` expansion.

use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{DeriveInput, parse2};

use crate::attrs::{IdField, MergeField, ModelOptions, find_id_field, merge_fields};

/// Expand `#[derive(Identified)]`.
pub fn expand_identified(input: TokenStream) -> syn::Result<TokenStream> {
    let input: DeriveInput = parse2(input)?;
    let options = ModelOptions::parse(&input.attrs)?;
    let id_field = find_id_field(&input, &options)?;

    let identified = identified_impl(&input, &id_field);
    let merge = merge_impl(&input, &merge_fields(&input)?);

    Ok(quote! {
        #identified
        #merge
    })
}

/// Expand `#[derive(Model)]`: both the `Identified` and `Model` impls.
pub fn expand_model(input: TokenStream) -> syn::Result<TokenStream> {
    let input: DeriveInput = parse2(input)?;
    let options = ModelOptions::parse(&input.attrs)?;
    let id_field = find_id_field(&input, &options)?;

    let Some(path) = options.path.as_ref() else {
        return Err(syn::Error::new_spanned(
            &input.ident,
            "missing resource path: add `#[model(path = \"/...\")]`",
        ));
    };

    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let hook = options.after_materialize.as_ref().map(|method| {
        quote! {
            fn after_materialize(&mut self) {
                self.#method();
            }
        }
    });

    let identified = identified_impl(&input, &id_field);
    let merge = merge_impl(&input, &merge_fields(&input)?);

    Ok(quote! {
        #identified
        #merge

        impl #impl_generics ::rivet::Model for #name #ty_generics #where_clause {
            const BASE_PATH: &'static str = #path;

            #hook
        }
    })
}

fn identified_impl(input: &DeriveInput, id_field: &IdField<'_>) -> TokenStream {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    let IdField {
        ident,
        ty,
        optional,
    } = id_field;

    let body = if *optional {
        quote! { ::core::clone::Clone::clone(&self.#ident) }
    } else {
        quote! { ::core::option::Option::Some(::core::clone::Clone::clone(&self.#ident)) }
    };

    quote! {
        impl #impl_generics ::rivet::Identified for #name #ty_generics #where_clause {
            type Id = #ty;

            fn id(&self) -> ::core::option::Option<Self::Id> {
                #body
            }
        }
    }
}

/// Every present key is decoded before any field is assigned, so a bad value
/// leaves the record untouched.
fn merge_impl(input: &DeriveInput, fields: &[MergeField<'_>]) -> TokenStream {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let locals: Vec<_> = (0..fields.len())
        .map(|index| format_ident!("__merge_{}", index))
        .collect();
    let decodes = fields.iter().zip(&locals).map(|(field, local)| {
        let MergeField { ty, key, .. } = field;
        quote! {
            let #local = match fields.remove(#key) {
                ::core::option::Option::Some(value) => {
                    ::core::option::Option::Some(::rivet::decode_field::<#ty>(#key, value)?)
                }
                ::core::option::Option::None => ::core::option::Option::None,
            };
        }
    });
    let assigns = fields.iter().zip(&locals).map(|(field, local)| {
        let ident = field.ident;
        quote! {
            if let ::core::option::Option::Some(value) = #local {
                self.#ident = value;
            }
        }
    });

    quote! {
        impl #impl_generics ::rivet::Merge for #name #ty_generics #where_clause {
            #[allow(unused_mut, unused_variables)]
            fn merge_fields(
                &mut self,
                mut fields: ::rivet::__private::Map<
                    ::std::string::String,
                    ::rivet::__private::Value,
                >,
            ) -> ::rivet::Result<()> {
                #(#decodes)*
                #(#assigns)*
                ::core::result::Result::Ok(())
            }
        }
    }
}
