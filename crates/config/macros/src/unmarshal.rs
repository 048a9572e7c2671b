use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{DeriveInput, Field, parse_macro_input};

use crate::support::{attrs, diag, utils};

const FIELD_ARGS: &[&str] = &["key", "required", "skip"];

pub fn derive(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match expand(input) {
        Ok(ts) => ts.into(),
        Err(e) => diag::to_compile_error(e),
    }
}

/// How one field is read.
struct FieldPlan<'a> {
    field: &'a Field,
    key: String,
    required: bool,
}

fn plan_field(field: &Field) -> syn::Result<Option<FieldPlan<'_>>> {
    let args = attrs::parse_attrs(&field.attrs, "config")?;
    args.ensure_known("config", FIELD_ARGS)?;

    let Some(ident) = &field.ident else {
        return Err(diag::error_spanned(field, "Unmarshal requires named fields"));
    };

    let key = match args.get_string("key")? {
        Some(key) if key.is_empty() => {
            return Err(diag::error_spanned(field, "`key` must not be empty"));
        }
        Some(key) => key,
        None => utils::default_key(ident),
    };

    if args.has_flag("skip") || key == "-" {
        return Ok(None);
    }

    Ok(Some(FieldPlan {
        field,
        key,
        required: args.has_flag("required"),
    }))
}

fn field_statement(plan: &FieldPlan<'_>) -> TokenStream2 {
    let ident = &plan.field.ident;
    let key = &plan.key;

    let on_missing = if plan.required {
        quote! {
            return ::std::result::Result::Err(
                ::keystone_config::ConfigError::required_field_missing(#key),
            );
        }
    } else {
        quote! {}
    };

    quote! {
        match tree.get(#key) {
            ::std::option::Option::Some(value) => {
                ::keystone_config::FieldValue::assign(&mut self.#ident, value)
                    .map_err(|e| ::keystone_config::ConfigError::field(#key, e))?;
            }
            ::std::option::Option::None => { #on_missing }
        }
    }
}

fn expand(input: DeriveInput) -> syn::Result<TokenStream2> {
    let struct_name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let container = attrs::parse_attrs(&input.attrs, "config")?;
    if let Some(item) = container.items.first() {
        return Err(diag::error_spanned(
            &input.ident,
            format!(
                "#[config] is only supported on fields, found `{}` on the struct",
                item.key()
            ),
        ));
    }

    let fields = utils::require_named_fields(&input)?;
    let mut statements = Vec::new();
    for field in &fields.named {
        if let Some(plan) = plan_field(field)? {
            statements.push(field_statement(&plan));
        }
    }

    Ok(quote! {
        impl #impl_generics ::keystone_config::Unmarshal for #struct_name #ty_generics #where_clause {
            #[allow(unused_variables)]
            fn unmarshal_from(
                &mut self,
                tree: &::keystone_config::ConfigTree,
            ) -> ::keystone_config::ConfigResult<()> {
                #(#statements)*
                ::std::result::Result::Ok(())
            }
        }

        impl #impl_generics ::keystone_config::FieldValue for #struct_name #ty_generics #where_clause {
            fn assign(
                &mut self,
                value: &::keystone_config::Value,
            ) -> ::keystone_config::ConfigResult<()> {
                match value {
                    ::keystone_config::Value::Map(tree) => {
                        ::keystone_config::Unmarshal::unmarshal_from(self, tree)
                    }
                    other => ::std::result::Result::Err(::keystone_config::ConfigError::conversion(
                        ::std::format!(
                            "cannot set struct field with value of type {}",
                            other.type_name()
                        ),
                    )),
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expand_str(src: &str) -> syn::Result<String> {
        let input: DeriveInput = syn::parse_str(src)?;
        expand(input).map(|ts| ts.to_string())
    }

    #[test]
    fn keys_default_to_lowercased_names() {
        let out = expand_str("struct Db { Host: String, #[config(key = \"max_conns\")] pool: u32 }")
            .unwrap();
        assert!(out.contains("\"host\""));
        assert!(out.contains("\"max_conns\""));
        assert!(!out.contains("\"pool\""));
    }

    #[test]
    fn skipped_fields_are_not_read() {
        let out = expand_str(
            "struct Db { #[config(skip)] cache: u32, #[config(key = \"-\")] other: u32, host: String }",
        )
        .unwrap();
        assert!(!out.contains("\"cache\""));
        assert!(!out.contains("\"-\""));
        assert!(out.contains("\"host\""));
    }

    #[test]
    fn required_fields_fail_when_missing() {
        let out = expand_str("struct Db { #[config(required)] host: String }").unwrap();
        assert!(out.contains("required_field_missing"));
    }

    #[test]
    fn container_attributes_are_rejected() {
        let err = expand_str("#[config(required)] struct Db { host: String }").unwrap_err();
        assert!(err.to_string().contains("only supported on fields"));
    }
}
