use proc_macro::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Fields, FieldsNamed, Ident, LitStr};

pub fn derive_entity(input: TokenStream) -> TokenStream {
    let input = syn::parse_macro_input!(input as DeriveInput);

    match expand(&input) {
        Ok(tokens) => TokenStream::from(tokens),
        Err(err) => TokenStream::from(err.to_compile_error()),
    }
}

fn expand(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let name = &input.ident;
    let fields = named_fields(input)?;

    // #[entity(prefix = "...")] on the struct, or the snake_case type name
    let prefix = extract_prefix(input)?;
    let id_field = extract_id_field(input, fields)?;
    let checks: Vec<proc_macro2::TokenStream> = extract_non_empty_fields(fields)?
        .into_iter()
        .map(|field| {
            let field_name = field.to_string();
            quote! {
                if self.#field.trim().is_empty() {
                    return ::core::result::Result::Err(
                        ::entity_store::ValidationError::EmptyField {
                            prefix: #prefix,
                            field: #field_name,
                        },
                    );
                }
            }
        })
        .collect();

    let expanded = quote! {
        impl ::entity_store::Entity for #name {
            const PREFIX: &'static str = #prefix;

            fn id(&self) -> &str {
                &self.#id_field
            }

            fn validate(&self) -> ::core::result::Result<(), ::entity_store::ValidationError> {
                if self.#id_field.trim().is_empty() {
                    return ::core::result::Result::Err(
                        ::entity_store::ValidationError::EmptyId { prefix: #prefix },
                    );
                }
                #(#checks)*
                ::core::result::Result::Ok(())
            }
        }
    };

    Ok(expanded)
}

fn named_fields(input: &DeriveInput) -> syn::Result<&FieldsNamed> {
    if let Data::Struct(data_struct) = &input.data {
        if let Fields::Named(fields) = &data_struct.fields {
            return Ok(fields);
        }
    }
    Err(syn::Error::new_spanned(
        &input.ident,
        "Entity derive: only structs with named fields are supported",
    ))
}

fn extract_prefix(input: &DeriveInput) -> syn::Result<String> {
    for attr in &input.attrs {
        if !attr.path().is_ident("entity") {
            continue;
        }

        let mut prefix = None;
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("prefix") {
                let value: LitStr = meta.value()?.parse()?;
                prefix = Some(value.value());
                Ok(())
            } else {
                Err(meta.error("expected `prefix = \"...\"`"))
            }
        })?;

        if let Some(p) = prefix {
            check_prefix(&p).map_err(|msg| syn::Error::new_spanned(attr, msg))?;
            return Ok(p);
        }
    }

    let p = to_snake_case(&input.ident.to_string());
    check_prefix(&p).map_err(|msg| syn::Error::new_spanned(&input.ident, msg))?;
    Ok(p)
}

/// Keys are `"{prefix}:{id}"`; store metadata lives under `"__meta:"`.
fn check_prefix(prefix: &str) -> Result<(), &'static str> {
    if prefix.is_empty() || prefix.contains(':') {
        return Err("Entity derive: prefix must be non-empty and must not contain ':'");
    }
    if prefix.starts_with("__") {
        return Err("Entity derive: prefixes starting with `__` are reserved for store metadata");
    }
    Ok(())
}

fn extract_id_field(input: &DeriveInput, fields: &FieldsNamed) -> syn::Result<Ident> {
    for field in &fields.named {
        if has_flag(field, "id")? {
            if let Some(ident) = &field.ident {
                return Ok(ident.clone());
            }
        }
    }

    // Default: look for a field named "id"
    for field in &fields.named {
        if let Some(ident) = &field.ident {
            if ident == "id" {
                return Ok(ident.clone());
            }
        }
    }

    Err(syn::Error::new_spanned(
        &input.ident,
        "Entity derive: no field marked with #[entity(id)] and no field named `id`",
    ))
}

fn extract_non_empty_fields(fields: &FieldsNamed) -> syn::Result<Vec<Ident>> {
    let mut required = Vec::new();
    for field in &fields.named {
        if has_flag(field, "non_empty")? {
            if let Some(ident) = &field.ident {
                required.push(ident.clone());
            }
        }
    }
    Ok(required)
}

fn has_flag(field: &syn::Field, flag: &str) -> syn::Result<bool> {
    let mut found = false;
    for attr in &field.attrs {
        if !attr.path().is_ident("entity") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("id") || meta.path.is_ident("non_empty") {
                if meta.path.is_ident(flag) {
                    found = true;
                }
                Ok(())
            } else {
                Err(meta.error("expected `id` or `non_empty`"))
            }
        })?;
    }
    Ok(found)
}

fn to_snake_case(s: &str) -> String {
    let mut result = String::new();
    for (i, ch) in s.chars().enumerate() {
        if ch.is_uppercase() {
            if i > 0 {
                result.push('_');
            }
            result.extend(ch.to_lowercase());
        } else {
            result.push(ch);
        }
    }
    result
}
