use super::AttachmentDescriptor;
use crate::config::SelectionOptions;

/// Attachments surviving the remux.
///
/// `keep_all_attachments` wins over any type filter. A filter token matches
/// when it is a case-sensitive substring of the content type, so `font`
/// catches both `font/ttf` and `application/x-font-otf`.
pub fn select_attachments<'a>(
    attachments: &'a [AttachmentDescriptor],
    options: &SelectionOptions,
) -> Vec<&'a AttachmentDescriptor> {
    if options.keep_all_attachments {
        return attachments.iter().collect();
    }

    match &options.keep_attachment_types {
        Some(types) => attachments
            .iter()
            .filter(|a| types.iter().any(|t| a.content_type.contains(t.as_str())))
            .collect(),
        None => Vec::new(),
    }
}
