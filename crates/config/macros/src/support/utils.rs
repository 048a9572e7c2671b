use syn::spanned::Spanned;
use syn::{Data, DeriveInput, Fields, Ident};

/// Return the named fields of a struct, or an error for any other shape.
pub fn require_named_fields(input: &DeriveInput) -> syn::Result<&syn::FieldsNamed> {
    let fields = match &input.data {
        Data::Struct(s) => &s.fields,
        _ => {
            return Err(syn::Error::new(
                input.ident.span(),
                "Unmarshal can only be derived for structs",
            ));
        }
    };

    match fields {
        Fields::Named(named) => Ok(named),
        Fields::Unnamed(_) => Err(syn::Error::new(
            fields.span(),
            "Unmarshal requires a struct with named fields (e.g. `struct X { ... }`)",
        )),
        Fields::Unit => Err(syn::Error::new(
            fields.span(),
            "Unmarshal requires a non-unit struct with fields",
        )),
    }
}

/// Default configuration key for a field: its name, lowercased, without
/// any raw-identifier prefix.
pub fn default_key(ident: &Ident) -> String {
    let name = ident.to_string();
    name.strip_prefix("r#").unwrap_or(&name).to_lowercase()
}
