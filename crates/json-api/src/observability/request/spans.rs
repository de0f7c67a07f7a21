//! Route templates for span names and metric labels.

use uuid::Uuid;

/// Rewrite a concrete path into its route shape, so that
/// `/api/orders/<uuid>/pay` becomes `/api/orders/{order}/pay`.
pub(super) fn route_template(path: &str) -> String {
    let mut template = String::with_capacity(path.len());
    let mut previous = "";

    for segment in path.split('/').filter(|segment| !segment.is_empty()) {
        template.push('/');

        if Uuid::parse_str(segment).is_ok() {
            template.push_str(param_name(previous));
        } else {
            template.push_str(segment);
        }

        previous = segment;
    }

    if template.is_empty() {
        template.push('/');
    }

    template
}

fn param_name(collection: &str) -> &'static str {
    match collection {
        "products" | "items" => "{product}",
        "orders" => "{order}",
        "tokens" => "{token}",
        _ => "{id}",
    }
}
