use parse_size::parse_size;
use proc_macro::TokenStream;
use quote::quote;
use syn::{
    parse_macro_input, Attribute, Data, DeriveInput, Field, Fields, FieldsNamed, GenericArgument,
    Lit, Meta, MetaList, MetaNameValue, NestedMeta, PathArguments, PathSegment, Type, TypePath,
};

/// What a field's Rust type declares to the schema.
#[derive(Clone, Copy, PartialEq)]
enum PropertyKind {
    File,
    FileArray,
    Text,
    Integer,
    Number,
    Boolean,
    Array,
    Object,
}

/// Upload limits collected from `#[multipart(max_size = ..., accept = "...")]`.
struct FileLimits {
    max_size: Option<usize>,
    accept: Option<Vec<String>>,
}

/// Derives a body schema from the struct's fields: `File` and `Vec<File>`
/// become upload properties carrying the attribute limits, primitives map to
/// their schema types, everything else is treated as an object.
#[proc_macro_derive(MultipartForm, attributes(multipart))]
pub fn multipart_form(input: TokenStream) -> TokenStream {
    let ast = parse_macro_input!(input as DeriveInput);
    let name = ast.ident;

    let fields = if let Data::Struct(syn::DataStruct {
        fields: Fields::Named(FieldsNamed { ref named, .. }),
        ..
    }) = ast.data
    {
        named
    } else {
        panic!("can only derive on a struct with named fields")
    };

    let field_properties = fields.iter().map(|field| {
        let Field { attrs, ty, ident, .. } = field;

        let limits = match parse_limits(attrs) {
            Ok(limits) => limits,
            Err(err) => return err,
        };

        property_tokens(property_kind(ty), limits, ident)
    });

    let field_len = fields.len();

    let expanded = quote! {
        impl actix_multipart_schema::form::MultipartForm for #name {
            fn schema() -> actix_multipart_schema::MultipartSchema {
                // Properties ordered by field, zipped with the serde renamed
                // field names.
                let properties: [actix_multipart_schema::SchemaProperty; #field_len] =
                    [#(#field_properties,)*];

                actix_multipart_schema::serde_introspect::<Self>()
                    .iter()
                    .map(|field| (*field).to_owned())
                    .zip(properties)
                    .collect()
            }
        }
    };

    expanded.into()
}

fn parse_limits(attrs: &[Attribute]) -> Result<FileLimits, proc_macro2::TokenStream> {
    let mut limits = FileLimits {
        max_size: None,
        accept: None,
    };

    for attr in attrs {
        let list = match attr.parse_meta() {
            Ok(Meta::List(list)) => list,
            _ => continue,
        };
        if !list.path.is_ident("multipart") {
            continue;
        }

        let MetaList { nested, .. } = list;
        for meta in nested {
            let MetaNameValue { path, lit, .. } = match meta {
                NestedMeta::Meta(Meta::NameValue(name_value)) => name_value,
                _ => continue,
            };

            if path.is_ident("max_size") {
                let lit_string = match &lit {
                    Lit::Int(l) => l.to_string(),
                    Lit::Float(f) => f.to_string(),
                    _ => {
                        return Err(syn::Error::new(
                            lit.span(),
                            "must be a number with size suffix",
                        )
                        .to_compile_error())
                    }
                };

                match parse_size(lit_string) {
                    Ok(v) => limits.max_size = Some(v as usize),
                    Err(_) => {
                        return Err(syn::Error::new(lit.span(), "invalid size").to_compile_error())
                    }
                }
            } else if path.is_ident("accept") {
                match &lit {
                    Lit::Str(s) => {
                        limits.accept = Some(
                            s.value()
                                .split(',')
                                .map(|mime| mime.trim().to_owned())
                                .filter(|mime| !mime.is_empty())
                                .collect(),
                        )
                    }
                    _ => {
                        return Err(syn::Error::new(
                            lit.span(),
                            "must be a comma separated list of mime types",
                        )
                        .to_compile_error())
                    }
                }
            }
        }
    }

    Ok(limits)
}

fn property_tokens(
    kind: PropertyKind,
    limits: FileLimits,
    ident: &Option<syn::Ident>,
) -> proc_macro2::TokenStream {
    let span = match ident {
        Some(ident) => ident.span(),
        None => proc_macro2::Span::call_site(),
    };

    match kind {
        PropertyKind::File | PropertyKind::FileArray => {
            let max_size = match limits.max_size {
                Some(max_size) => max_size,
                None => {
                    return syn::Error::new(
                        span,
                        "file fields need #[multipart(max_size = ...)], e.g. max_size = 5MB",
                    )
                    .to_compile_error()
                }
            };
            let accept = match limits.accept {
                Some(accept) => accept,
                None => {
                    return syn::Error::new(
                        span,
                        "file fields need #[multipart(accept = \"...\")], a comma separated list of mime types",
                    )
                    .to_compile_error()
                }
            };

            if kind == PropertyKind::File {
                quote! { actix_multipart_schema::SchemaProperty::file(#max_size, &[#(#accept),*]) }
            } else {
                quote! { actix_multipart_schema::SchemaProperty::file_array(#max_size, &[#(#accept),*]) }
            }
        }
        PropertyKind::Text => schema_of(quote! { String }),
        PropertyKind::Integer => schema_of(quote! { Integer }),
        PropertyKind::Number => schema_of(quote! { Number }),
        PropertyKind::Boolean => schema_of(quote! { Boolean }),
        PropertyKind::Array => schema_of(quote! { Array }),
        PropertyKind::Object => schema_of(quote! { Object }),
    }
}

fn schema_of(variant: proc_macro2::TokenStream) -> proc_macro2::TokenStream {
    quote! {
        actix_multipart_schema::SchemaProperty::of(actix_multipart_schema::SchemaType::#variant)
    }
}

fn property_kind(ty: &Type) -> PropertyKind {
    let segment = match ty {
        Type::Path(TypePath { path, .. }) => match path.segments.last() {
            Some(segment) => segment,
            None => return PropertyKind::Object,
        },
        _ => return PropertyKind::Object,
    };

    match segment.ident.to_string().as_str() {
        "File" => PropertyKind::File,
        "Vec" => match inner_type(segment) {
            Some(inner) if property_kind(inner) == PropertyKind::File => PropertyKind::FileArray,
            _ => PropertyKind::Array,
        },
        // Optional fields declare the schema of their inner type; absence
        // is the host deserializer's concern.
        "Option" => match inner_type(segment) {
            Some(inner) => property_kind(inner),
            None => PropertyKind::Object,
        },
        "bool" => PropertyKind::Boolean,
        "i8" | "i16" | "i32" | "i64" | "i128" | "isize" | "u8" | "u16" | "u32" | "u64" | "u128"
        | "usize" => PropertyKind::Integer,
        "f32" | "f64" => PropertyKind::Number,
        "String" | "str" => PropertyKind::Text,
        _ => PropertyKind::Object,
    }
}

fn inner_type(segment: &PathSegment) -> Option<&Type> {
    if let PathArguments::AngleBracketed(arguments) = &segment.arguments {
        for argument in &arguments.args {
            if let GenericArgument::Type(ty) = argument {
                return Some(ty);
            }
        }
    }
    None
}
