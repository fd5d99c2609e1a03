use proc_macro::TokenStream;
use proc_macro2::Span;
use quote::quote;
use syn::{Data, DeriveInput, Fields, LitStr, parse_macro_input, spanned::Spanned};

pub fn derive_kv_display_inner(item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    let struct_ident = input.ident.clone();

    let Data::Struct(data_struct) = &input.data else {
        return syn::Error::new(input.span(), "KvDisplay can only be derived for structs")
            .to_compile_error()
            .into();
    };

    let Fields::Named(fields) = &data_struct.fields else {
        return syn::Error::new(input.span(), "KvDisplay requires named fields")
            .to_compile_error()
            .into();
    };

    let mut keys: Vec<String> = Vec::new();
    let mut writes = Vec::new();

    for field in &fields.named {
        let Some(field_ident) = &field.ident else {
            continue;
        };
        let key = field_ident.to_string();
        let mut fmt_mode = String::from("display");

        for attr in field.attrs.iter().filter(|a| a.path().is_ident("kv")) {
            let parsed = attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("fmt") {
                    let lit: LitStr = meta.value()?.parse()?;
                    fmt_mode = lit.value();
                    return Ok(());
                }
                Err(meta.error("unsupported kv attribute; expected fmt"))
            });
            if let Err(err) = parsed {
                return err.to_compile_error().into();
            }
        }
        let value = match fmt_mode.as_str() {
            "display" => quote! { self.#field_ident },
            "path" => quote! { self.#field_ident.display() },
            "opt" => quote! {
                match &self.#field_ident {
                    Some(v) => v.to_string(),
                    None => String::from("-"),
                }
            },
            "str" => quote! {
                if self.#field_ident.is_empty() { "-" } else { self.#field_ident.as_str() }
            },
            other => {
                return syn::Error::new(field.span(), format!("unsupported kv fmt mode: {other}"))
                    .to_compile_error()
                    .into();
            }
        };
        writes.push(value);
        keys.push(key);
    }

    let width = keys.iter().map(String::len).max().unwrap_or(0);
    let lines: Vec<LitStr> = keys
        .iter()
        .map(|key| LitStr::new(&format!("\n\t{key:<width$} = {{}}"), Span::call_site()))
        .collect();

    let expanded = quote! {
        impl std::fmt::Display for #struct_ident {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                #(write!(f, #lines, #writes)?;)*
                Ok(())
            }
        }
    };

    TokenStream::from(expanded)
}
