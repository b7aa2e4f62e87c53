// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Uniform tree view over a decoded container.
//!
//! Presentation layers only need three read-only operations on any node:
//! how many children it has, the child at an index, and a label to show.
//! [`Node`] provides them for containers, groups and records; records are
//! leaves.

use crate::core::tag::Tag;
use crate::io::formats::tes4::{Child, Container, Group, GroupKind, Record};
use crate::Result;

/// Read-only hierarchical data source.
pub trait TreeSource: Sized {
    /// Number of direct children.
    fn child_count(&self) -> Result<usize>;

    /// Child at `index`, or `None` past the end.
    fn child_at(&self, index: usize) -> Result<Option<Self>>;

    /// Text shown for this node.
    fn display_label(&self) -> String;
}

/// A node of the container tree.
#[derive(Debug, Clone)]
pub enum Node<'c, 'a> {
    Container(&'c Container<'a>),
    Group(Group<'a>),
    Record(Record<'a>),
}

impl<'c, 'a> Node<'c, 'a> {
    /// Root node of a container.
    pub fn root(container: &'c Container<'a>) -> Self {
        Node::Container(container)
    }

    /// Type tag of the node: `TES4`, `GRUP`, or the record type.
    pub fn tag(&self) -> Tag {
        match self {
            Node::Container(c) => c.header().tag(),
            Node::Group(_) => Tag::GRUP,
            Node::Record(r) => r.tag(),
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Record(_))
    }

    /// Children in file order. The sequence is re-derived on every call.
    pub fn children(&self) -> Children<'_, 'c, 'a> {
        Children {
            node: self,
            index: 0,
        }
    }
}

impl<'a> From<Child<'a>> for Node<'_, 'a> {
    fn from(child: Child<'a>) -> Self {
        match child {
            Child::Group(g) => Node::Group(g),
            Child::Record(r) => Node::Record(r),
        }
    }
}

impl TreeSource for Node<'_, '_> {
    fn child_count(&self) -> Result<usize> {
        match self {
            Node::Container(c) => Ok(c.groups()?.len()),
            Node::Group(g) => g.child_count(),
            Node::Record(_) => Ok(0),
        }
    }

    fn child_at(&self, index: usize) -> Result<Option<Self>> {
        match self {
            Node::Container(c) => Ok(c.groups()?.get(index).cloned().map(Node::Group)),
            Node::Group(g) => Ok(g.child_at(index)?.map(Node::from)),
            Node::Record(_) => Ok(None),
        }
    }

    fn display_label(&self) -> String {
        match self {
            Node::Container(c) => c.header().tag().to_string(),
            Node::Group(g) => group_label(g),
            Node::Record(r) => r.label(),
        }
    }
}

fn group_label(group: &Group<'_>) -> String {
    match group.kind() {
        GroupKind::Top => group.label().to_string(),
        kind => format!("{kind} {:08X}", group.label_value()),
    }
}

/// Iterator over the children of a [`Node`].
pub struct Children<'n, 'c, 'a> {
    node: &'n Node<'c, 'a>,
    index: usize,
}

impl<'c, 'a> Iterator for Children<'_, 'c, 'a> {
    type Item = Result<Node<'c, 'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.node.child_at(self.index) {
            Ok(Some(child)) => {
                self.index += 1;
                Some(Ok(child))
            }
            Ok(None) => None,
            Err(e) => {
                self.index = usize::MAX;
                Some(Err(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::value::FormId;
    use crate::io::formats::tes4::constants::NO_NAME;
    use crate::io::formats::tes4::writer::{
        ContainerWriter, GroupBuilder, RecordBuilder, SubRecordBuilder,
    };
    use crate::WriteOptions;

    fn sample() -> Vec<u8> {
        let mut writer = ContainerWriter::in_memory(WriteOptions::default());
        writer
            .set_header(RecordBuilder::new(Tag::TES4, FormId(0)))
            .unwrap();

        let mut gmst = GroupBuilder::top(Tag::new(b"GMST"));
        gmst.push_record(RecordBuilder::new(Tag::new(b"GMST"), FormId(0x10)));
        writer.add_group(gmst);

        let mut clas = GroupBuilder::top(Tag::new(b"CLAS"));
        let mut knight = RecordBuilder::new(Tag::new(b"CLAS"), FormId(0x20));
        knight.push(SubRecordBuilder::zstring_default(Tag::FULL, "Knight").unwrap());
        clas.push_record(knight);
        writer.add_group(clas);
        writer.to_vec().unwrap()
    }

    #[test]
    fn test_top_level_children_in_order() {
        let bytes = sample();
        let container = Container::new(&bytes).unwrap();
        let root = Node::root(&container);
        assert_eq!(root.display_label(), "TES4");
        assert_eq!(root.child_count().unwrap(), 2);
        let labels: Vec<String> = root
            .children()
            .map(|n| n.unwrap().display_label())
            .collect();
        assert_eq!(labels, vec!["GMST", "CLAS"]);
        assert!(root.child_at(2).unwrap().is_none());
    }

    #[test]
    fn test_record_labels_and_leaves() {
        let bytes = sample();
        let container = Container::new(&bytes).unwrap();
        let root = Node::root(&container);

        let gmst = root.child_at(0).unwrap().unwrap();
        let unnamed = gmst.child_at(0).unwrap().unwrap();
        assert_eq!(unnamed.display_label(), NO_NAME);
        assert!(unnamed.is_leaf());
        assert_eq!(unnamed.child_count().unwrap(), 0);
        assert!(unnamed.child_at(0).unwrap().is_none());

        let clas = root.child_at(1).unwrap().unwrap();
        let knight = clas.child_at(0).unwrap().unwrap();
        assert_eq!(knight.display_label(), "Knight");
        assert_eq!(knight.tag(), Tag::new(b"CLAS"));
    }

    #[test]
    fn test_children_restartable() {
        let bytes = sample();
        let container = Container::new(&bytes).unwrap();
        let root = Node::root(&container);
        assert_eq!(root.children().count(), 2);
        assert_eq!(root.children().count(), 2);
    }
}
