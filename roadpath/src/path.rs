use std::iter;

use crate::find::{Event, MapStorage, MapTrait, Mark, NodeReference, Visited, VisitedItem};

/// Backtrack through the predecessor map from `terminal` to the start.
///
/// Returns the nodes ordered from the start to `terminal`, or `None` if `terminal` was never
/// reached.
pub fn reconstruct<R, S>(visited: &S, terminal: R) -> Option<Vec<R>>
where
    R: NodeReference,
    S: MapStorage<Visited<R>, Reference = R>,
{
    let mut path: Vec<R> = vec![terminal];
    let mut previous_visit = visited.get(terminal);

    loop {
        previous_visit = match previous_visit {
            Visited(Some(VisitedItem { from: None, .. })) => {
                // we found the starting point, we are done
                break;
            }
            Visited(Some(VisitedItem {
                from: Some(from), ..
            })) => {
                path.push(from);
                visited.get(from)
            }
            Visited(None) => return None,
        }
    }

    path.reverse();
    Some(path)
}

/// Marks for drawing a path: every node on it followed by its neighbors, which only widen the
/// line on screen and are not part of the path.
pub fn highlight<'a, M: MapTrait>(
    map: &'a M,
    path: &'a [M::Reference],
) -> impl Iterator<Item = Event<M::Reference>> + 'a {
    path.iter().flat_map(move |&node| {
        iter::once(node)
            .chain(map.neighbors_of(node))
            .map(|node| Event {
                node,
                mark: Mark::Path,
            })
    })
}
