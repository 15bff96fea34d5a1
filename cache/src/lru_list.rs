use crate::error::{Error, Result};

use std::hash::Hash;

use ahash::{HashMap, HashMapExt};
use generational_arena::{Arena, Index};

#[derive(Debug)]
pub(crate) struct Node<K, T> {
  pub(crate) key: K,
  pub(crate) value: T,
  pub(crate) next: Option<Index>,
  pub(crate) prev: Option<Index>,
}

// An arena-backed doubly linked recency list with a key index.
// Promotion and eviction splice nodes in place, nothing is copied.
#[derive(Debug)]
pub(crate) struct LruList<K: Eq + Hash + Clone, T> {
  // Arena stores all nodes contiguously.
  pub(crate) nodes: Arena<Node<K, T>>,
  // Key to node position.
  pub(crate) lookup: HashMap<K, Index>,
  // Head is the most-recently-used entry.
  pub(crate) head: Option<Index>,
  // Tail is the least-recently-used entry, the next victim.
  pub(crate) tail: Option<Index>,
}

impl<K: Eq + Hash + Clone, T> LruList<K, T> {
  pub fn with_capacity(capacity: usize) -> Self {
    Self {
      nodes: Arena::with_capacity(capacity),
      lookup: HashMap::with_capacity(capacity),
      head: None,
      tail: None,
    }
  }

  // Unlinks a node from the list without removing it from the arena or map.
  fn unlink(&mut self, index: Index) {
    let node = &self.nodes[index];
    let prev_node_idx = node.prev;
    let next_node_idx = node.next;

    if let Some(prev_idx) = prev_node_idx {
      self.nodes[prev_idx].next = next_node_idx;
    } else {
      self.head = next_node_idx;
    }

    if let Some(next_idx) = next_node_idx {
      self.nodes[next_idx].prev = prev_node_idx;
    } else {
      self.tail = prev_node_idx;
    }
  }

  // Links a node already in the arena in as the new head.
  fn push_front_node(&mut self, index: Index) {
    let old_head_idx = self.head;
    self.nodes[index].next = old_head_idx;
    self.nodes[index].prev = None;
    self.head = Some(index);

    if let Some(old_head) = old_head_idx {
      self.nodes[old_head].prev = Some(index);
    }

    if self.tail.is_none() {
      self.tail = Some(index);
    }
  }

  pub fn len(&self) -> usize {
    self.nodes.len()
  }

  pub fn contains(&self, key: &K) -> bool {
    self.lookup.contains_key(key)
  }

  /// Moves the entry for `key` to the front and returns its value, or
  /// `None` if the key is not tracked.
  pub fn promote(&mut self, key: &K) -> Result<Option<&T>> {
    let index = match self.lookup.get(key) {
      Some(&index) => index,
      None => return Ok(None),
    };

    match self.nodes.get(index) {
      None => {
        return Err(Error::InternalConsistency(
          "indexed key points to a released list position".to_string(),
        ))
      }
      Some(node) if node.key != *key => {
        return Err(Error::InternalConsistency(
          "indexed key points to a list entry holding a different key".to_string(),
        ))
      }
      Some(_) => {}
    }

    if self.head != Some(index) {
      self.unlink(index);
      self.push_front_node(index);
    }

    Ok(Some(&self.nodes[index].value))
  }

  /// Inserts a new entry at the front. The key must not be tracked yet.
  pub fn push_front(&mut self, key: K, value: T) -> Result<()> {
    if self.lookup.contains_key(&key) {
      return Err(Error::InternalConsistency(
        "attempted to insert a key that is already tracked".to_string(),
      ));
    }

    let index = self.nodes.insert(Node {
      key: key.clone(),
      value,
      next: None,
      prev: None,
    });
    self.lookup.insert(key, index);
    self.push_front_node(index);
    Ok(())
  }

  /// Removes and returns the least-recently-used entry.
  pub fn pop_back(&mut self) -> Result<Option<(K, T)>> {
    let tail_index = match self.tail {
      Some(index) => index,
      None => return Ok(None),
    };

    let key = match self.nodes.get(tail_index) {
      Some(node) => node.key.clone(),
      None => {
        return Err(Error::InternalConsistency(
          "list tail points to a released position".to_string(),
        ))
      }
    };

    match self.lookup.get(&key) {
      Some(&index) if index == tail_index => {}
      Some(_) => {
        return Err(Error::InternalConsistency(
          "least recent key is indexed at a different list position".to_string(),
        ))
      }
      None => {
        return Err(Error::InternalConsistency(
          "least recent key in the list is missing from the index".to_string(),
        ))
      }
    }

    self.unlink(tail_index);
    self.lookup.remove(&key);
    match self.nodes.remove(tail_index) {
      Some(node) => Ok(Some((node.key, node.value))),
      None => Err(Error::InternalConsistency(
        "list tail vanished during eviction".to_string(),
      )),
    }
  }

  /// Keys from most to least recently used.
  pub fn keys(&self) -> Vec<K> {
    let mut keys = Vec::with_capacity(self.nodes.len());
    let mut current = self.head;
    while let Some(index) = current {
      keys.push(self.nodes[index].key.clone());
      current = self.nodes[index].next;
    }
    keys
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn list_of(keys: &[i32]) -> LruList<i32, String> {
    let mut list = LruList::with_capacity(keys.len());
    for key in keys {
      list.push_front(*key, format!("v{key}")).unwrap();
    }
    list
  }

  #[test]
  fn new_list_is_empty() {
    let mut list = LruList::<i32, ()>::with_capacity(4);
    assert!(list.keys().is_empty());
    assert_eq!(list.len(), 0);
    assert!(!list.contains(&123));
    assert_eq!(list.pop_back().unwrap(), None);
    assert_eq!(list.promote(&1).unwrap(), None);
  }

  #[test]
  fn push_front_orders_newest_first() {
    let list = list_of(&[10, 20]);
    assert!(list.contains(&10));
    assert!(list.contains(&20));
    assert_eq!(list.keys(), vec![20, 10], "Newest item should be at the front");
  }

  #[test]
  fn promote_moves_to_front() {
    let mut list = list_of(&[1, 2, 3]);
    assert_eq!(list.keys(), vec![3, 2, 1]);

    assert_eq!(list.promote(&1).unwrap().map(String::as_str), Some("v1"));
    assert_eq!(list.keys(), vec![1, 3, 2]);

    // Promoting the head is a no-op.
    list.promote(&1).unwrap();
    assert_eq!(list.keys(), vec![1, 3, 2]);

    // Promoting from the middle.
    list.promote(&3).unwrap();
    assert_eq!(list.keys(), vec![3, 1, 2]);
    assert_eq!(list.len(), 3);
  }

  #[test]
  fn pop_back_returns_least_recent() {
    let mut list = list_of(&[1, 2, 3]);
    list.promote(&1).unwrap();

    assert_eq!(list.pop_back().unwrap(), Some((2, "v2".to_string())));
    assert!(!list.contains(&2));
    assert_eq!(list.keys(), vec![1, 3]);

    assert_eq!(list.pop_back().unwrap(), Some((3, "v3".to_string())));
    assert_eq!(list.pop_back().unwrap(), Some((1, "v1".to_string())));
    assert_eq!(list.pop_back().unwrap(), None);
    assert!(list.lookup.is_empty());
    assert_eq!(list.head, None);
    assert_eq!(list.tail, None);
  }

  #[test]
  fn duplicate_insert_is_a_consistency_error() {
    let mut list = list_of(&[1]);
    let err = list.push_front(1, "again".into()).unwrap_err();
    assert!(matches!(err, Error::InternalConsistency(_)));
    assert_eq!(list.len(), 1);
  }

  #[test]
  fn promote_detects_key_mismatch() {
    let mut list = list_of(&[1, 2]);
    let index_of_two = list.lookup[&2];
    list.lookup.insert(1, index_of_two);

    let err = list.promote(&1).unwrap_err();
    assert!(matches!(err, Error::InternalConsistency(_)));
  }

  #[test]
  fn promote_detects_released_position() {
    let mut list = list_of(&[1, 2]);
    let index = list.lookup[&1];
    list.unlink(index);
    list.nodes.remove(index);

    let err = list.promote(&1).unwrap_err();
    assert!(matches!(err, Error::InternalConsistency(_)));
  }

  #[test]
  fn pop_back_detects_missing_index_entry() {
    let mut list = list_of(&[1, 2]);
    list.lookup.remove(&1);

    let err = list.pop_back().unwrap_err();
    assert!(matches!(err, Error::InternalConsistency(_)));
  }
}
