//! Turning a resolved location into a GitHub blob URL and handing it to the user.

use serde::Serialize;

use crate::domain::errors::LinkError;
use crate::domain::model::{Remote, RepositoryCoordinates, ResolvedLink};
use crate::infra::desktop::LinkSink;

/// Derive host, owner and repository from a remote's fetch URL.
///
/// Accepted forms are `git@<host>:<owner>/<repo>.git` and `https://<host>/<owner>/<repo>.git`,
/// where `<host>` is one of `hosts`.
pub fn coordinates(remote: &Remote, hosts: &[String]) -> Result<RepositoryCoordinates, LinkError> {
    parse_fetch_url(&remote.fetch_url, hosts).ok_or_else(|| {
        LinkError::UnrecognizedRemoteFormat {
            remote: remote.name.clone(),
            url: remote.fetch_url.clone(),
        }
    })
}

fn parse_fetch_url(url: &str, hosts: &[String]) -> Option<RepositoryCoordinates> {
    let url = url.trim();
    let (host, path) = if let Some(rest) = url.strip_prefix("git@") {
        rest.split_once(':')?
    } else if let Some(rest) = url.strip_prefix("https://") {
        rest.split_once('/')?
    } else {
        return None;
    };

    if !hosts.iter().any(|allowed| allowed.eq_ignore_ascii_case(host)) {
        return None;
    }

    let (owner, repo) = path.strip_suffix(".git")?.split_once('/')?;
    if owner.is_empty() || repo.is_empty() || repo.contains('/') {
        return None;
    }

    Some(RepositoryCoordinates {
        host: host.to_string(),
        owner: owner.to_string(),
        repo: repo.to_string(),
    })
}

/// Render `https://<host>/<owner>/<repo>/blob/<commit>/<path>#L<start>[-L<end>]`.
pub fn build_url(link: &ResolvedLink) -> String {
    let coordinates = &link.coordinates;
    let path = link
        .path
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/");

    let mut url = format!(
        "https://{}/{}/{}/blob/{}/{}",
        coordinates.host, coordinates.owner, coordinates.repo, link.commit, path
    );
    if let Some(range) = link.range {
        url.push('#');
        url.push_str(&range.anchor());
    }
    url
}

/// Side effects requested for a finished link.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Delivery {
    pub copy: bool,
    pub open: bool,
}

/// Which requested side effects went through.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DeliveryReport {
    pub copied: bool,
    pub opened: bool,
}

/// Perform the requested side effects. Failures are logged and reported, never raised.
pub fn deliver(url: &str, delivery: Delivery, sink: &mut dyn LinkSink) -> DeliveryReport {
    let mut report = DeliveryReport::default();
    if delivery.copy {
        match sink.copy(url) {
            Ok(()) => report.copied = true,
            Err(err) => tracing::warn!("could not copy link to clipboard: {err:#}"),
        }
    }
    if delivery.open {
        match sink.open(url) {
            Ok(()) => report.opened = true,
            Err(err) => tracing::warn!("could not open link in browser: {err:#}"),
        }
    }
    report
}
