use crate::error::DescriptionError;
use tandem_core::{ConnectionDescriptor, DescriptorKind, decode_input, encode_link, encode_token};
use url::Url;

/// A descriptor ready to be copied by hand or opened as a link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareableDescriptor {
    pub token: String,
    pub link: Url,
}

pub fn package(
    descriptor: &ConnectionDescriptor,
    link_base: &str,
) -> Result<ShareableDescriptor, DescriptionError> {
    Ok(ShareableDescriptor {
        token: encode_token(descriptor)?,
        link: encode_link(link_base, descriptor)?,
    })
}

/// Decodes pasted input and checks it is the kind of descriptor this step expects.
pub fn unpack(input: &str, expected: DescriptorKind) -> Result<ConnectionDescriptor, DescriptionError> {
    let descriptor = decode_input(input)?;
    if descriptor.kind != expected {
        return Err(DescriptionError::InvalidDescription(format!(
            "expected {:?} descriptor, got {:?}",
            expected, descriptor.kind
        )));
    }
    Ok(descriptor)
}
