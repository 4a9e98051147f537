// Copyright (c) 2025 gudzpoz
// Copyright (c) 2019 Sevag Hanssian
//
// Permission is hereby granted, free of charge, to any person obtaining a copy
// of this software and associated documentation files (the "Software"), to deal
// in the Software without restriction, including without limitation the rights
// to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
// copies of the Software, and to permit persons to whom the Software is
// furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in all
// copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
// AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
// OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
// SOFTWARE.

use slab::Slab;
use std::cmp::Ordering;
use std::marker::PhantomData;
use std::ops::{Index, IndexMut};

pub const LEFT: usize = 0;
pub const RIGHT: usize = 1;

/// A stable handle to a node in [RbSlab]
///
/// Handles stay valid until the node they point to is deleted,
/// including across rotations and deletions of other nodes.
#[derive(Eq, PartialEq, Copy, Clone, Debug, Hash)]
pub struct Ref(usize);

/// Tree links of a node
#[derive(Clone, Debug)]
pub struct Links {
    pub parent: Option<Ref>,
    pub children: [Option<Ref>; 2],
    pub red: bool,
}

#[derive(Clone, Debug)]
pub struct Node<T> {
    pub rb: Links,
    pub item: T,
}

/// Hooks fired by [RbSlab] whenever the shape of the tree changes
///
/// Implementors keep per-node aggregates in sync without knowing about the
/// balancing cases. All hooks default to doing nothing, which is what `()`
/// uses.
pub trait RebalanceListener<T>: Sized {
    /// `x` was rotated down to the left of `y`
    fn left_rotated(_tree: &mut RbSlab<T, Self>, _x: Ref, _y: Ref) {}
    /// `x` was rotated down to the right of `y`
    fn right_rotated(_tree: &mut RbSlab<T, Self>, _x: Ref, _y: Ref) {}
    /// `node` was linked in as a leaf
    fn attached(_tree: &mut RbSlab<T, Self>, _node: Ref) {}
    /// A node was unlinked; `lowest` is the deepest node whose subtree changed,
    /// or `None` if no ancestor remains
    fn detached(_tree: &mut RbSlab<T, Self>, _lowest: Option<Ref>) {}
}

impl<T> RebalanceListener<T> for () {}

/// A red-black tree whose nodes live in a [Slab]
///
/// The tree does not order items by itself: callers pass a comparator on
/// insertion and navigate with [RbSlab::child] and [RbSlab::next].
pub struct RbSlab<T, L = ()> {
    slab: Slab<Node<T>>,
    root: Option<Ref>,
    listener: PhantomData<L>,
}

impl<T, L> Default for RbSlab<T, L> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone, L> Clone for RbSlab<T, L> {
    fn clone(&self) -> Self {
        Self {
            slab: self.slab.clone(),
            root: self.root,
            listener: PhantomData,
        }
    }
}

impl<T, L> Index<Ref> for RbSlab<T, L> {
    type Output = Node<T>;

    fn index(&self, index: Ref) -> &Self::Output {
        &self.slab[index.0]
    }
}
impl<T, L> IndexMut<Ref> for RbSlab<T, L> {
    fn index_mut(&mut self, index: Ref) -> &mut Self::Output {
        &mut self.slab[index.0]
    }
}

impl<T, L> RbSlab<T, L> {
    pub fn new() -> Self {
        Self {
            slab: Slab::new(),
            root: None,
            listener: PhantomData,
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slab: Slab::with_capacity(capacity),
            root: None,
            listener: PhantomData,
        }
    }

    pub fn len(&self) -> usize {
        self.slab.len()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    pub fn root(&self) -> Option<Ref> {
        self.root
    }

    pub fn clear(&mut self) {
        self.slab.clear();
        self.root = None;
    }

    pub fn item(&self, node: Ref) -> &T {
        &self[node].item
    }

    pub fn item_mut(&mut self, node: Ref) -> &mut T {
        &mut self[node].item
    }

    pub fn child(&self, node: Ref, dir: usize) -> Option<Ref> {
        self[node].rb.children[dir]
    }

    pub fn parent(&self, node: Ref) -> Option<Ref> {
        self[node].rb.parent
    }

    /// `None` stands for the black nil leaves
    pub fn is_red(&self, node: Option<Ref>) -> bool {
        node.is_some_and(|n| self[n].rb.red)
    }

    fn side(&self, parent: Ref, child: Option<Ref>) -> usize {
        if self[parent].rb.children[LEFT] == child {
            LEFT
        } else {
            RIGHT
        }
    }

    /// The outermost descendant of `this` in direction `dir`
    pub fn edge(&self, mut this: Ref, dir: usize) -> Ref {
        while let Some(node) = self[this].rb.children[dir] {
            this = node;
        }
        this
    }

    /// The in-order neighbour of `this`: successor for [RIGHT],
    /// predecessor for [LEFT]
    pub fn next(&self, mut this: Ref, dir: usize) -> Option<Ref> {
        if let Some(child) = self[this].rb.children[dir] {
            return Some(self.edge(child, dir ^ 1));
        }
        let mut y = self[this].rb.parent;
        while let Some(p) = y {
            if self[p].rb.children[dir] != Some(this) {
                break;
            }
            this = p;
            y = self[p].rb.parent;
        }
        y
    }

    pub fn first(&self) -> Option<Ref> {
        self.root.map(|root| self.edge(root, LEFT))
    }

    pub fn last(&self) -> Option<Ref> {
        self.root.map(|root| self.edge(root, RIGHT))
    }

    /// Descends from the root following `f`, which tells whether the
    /// wanted item lies to the left (`Greater`), right (`Less`) or here
    pub fn search_by<F>(&self, mut f: F) -> Option<Ref>
    where
        F: FnMut(&T) -> Ordering,
    {
        let mut curr = self.root;
        while let Some(node) = curr {
            curr = match f(&self[node].item) {
                Ordering::Equal => return Some(node),
                Ordering::Greater => self[node].rb.children[LEFT],
                Ordering::Less => self[node].rb.children[RIGHT],
            };
        }
        None
    }

    /// Iterates the subtree under `ceiling` (the whole tree for `None`)
    ///
    /// `reverse` walks the exact reverse of the forward sequence.
    pub fn walk(&self, order: Order, reverse: bool, ceiling: Option<Ref>) -> Walk<'_, T, L> {
        let (order, first) = match (order, reverse) {
            (order, false) => (order, LEFT),
            (Order::In, true) => (Order::In, RIGHT),
            (Order::Pre, true) => (Order::Post, RIGHT),
            (Order::Post, true) => (Order::Pre, RIGHT),
        };
        let top = ceiling.or(self.root);
        let next = top.map(|top| match order {
            Order::Pre => top,
            Order::In => self.edge(top, first),
            Order::Post => self.deepest(top, first),
        });
        Walk {
            tree: self,
            order,
            first,
            top,
            next,
        }
    }

    /// The first node of a post-order walk under `this`
    fn deepest(&self, mut this: Ref, first: usize) -> Ref {
        loop {
            let children = self[this].rb.children;
            match (children[first], children[first ^ 1]) {
                (Some(child), _) | (None, Some(child)) => this = child,
                (None, None) => return this,
            }
        }
    }
}

impl<T, L: RebalanceListener<T>> RbSlab<T, L> {
    /// Lifts the `dir ^ 1` child of `x` into its place
    ///
    /// `rotate(x, LEFT)` is a left rotation.
    pub fn rotate(&mut self, x: Ref, dir: usize) {
        debug_assert!(dir == LEFT || dir == RIGHT);
        let Some(y) = self[x].rb.children[dir ^ 1] else {
            debug_assert!(false, "rotation without a child to lift");
            return;
        };

        let y_child = self[y].rb.children[dir];
        self[x].rb.children[dir ^ 1] = y_child;
        if let Some(y_child) = y_child {
            self[y_child].rb.parent = Some(x);
        }
        self.transplant(x, Some(y));
        self[y].rb.children[dir] = Some(x);
        self[x].rb.parent = Some(y);

        if dir == LEFT {
            L::left_rotated(self, x, y);
        } else {
            L::right_rotated(self, x, y);
        }
    }

    /// Puts `with` where `node` hangs, leaving `node` detached from its parent
    fn transplant(&mut self, node: Ref, with: Option<Ref>) {
        let parent = self[node].rb.parent;
        match parent {
            None => self.root = with,
            Some(parent) => {
                let dir = self.side(parent, Some(node));
                self[parent].rb.children[dir] = with;
            }
        }
        if let Some(with) = with {
            self[with].rb.parent = parent;
        }
    }

    /// Inserts `item` as a leaf found by descending with `cmp(item, existing)`
    ///
    /// Items comparing equal go to the right of existing ones.
    pub fn insert_by<F>(&mut self, item: T, mut cmp: F) -> Ref
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        let mut parent = None;
        let mut dir = LEFT;
        let mut x = self.root;
        while let Some(node) = x {
            parent = Some(node);
            dir = if cmp(&item, &self[node].item) == Ordering::Less {
                LEFT
            } else {
                RIGHT
            };
            x = self[node].rb.children[dir];
        }

        let z = Ref(self.slab.insert(Node {
            rb: Links {
                parent,
                children: [None, None],
                red: true,
            },
            item,
        }));
        match parent {
            None => self.root = Some(z),
            Some(parent) => self[parent].rb.children[dir] = Some(z),
        }
        L::attached(self, z);
        self.fix_insert(z);
        z
    }

    fn fix_insert(&mut self, mut z: Ref) {
        while let Some(mut p) = self[z].rb.parent {
            if !self[p].rb.red {
                break;
            }
            // a red parent is never the root
            let Some(pp) = self[p].rb.parent else {
                break;
            };

            let dir = if self[pp].rb.children[LEFT] == Some(p) {
                RIGHT
            } else {
                LEFT
            };
            let uncle = self[pp].rb.children[dir];

            if let Some(uncle) = uncle.filter(|&u| self[u].rb.red) {
                self[p].rb.red = false;
                self[uncle].rb.red = false;
                self[pp].rb.red = true;
                z = pp;
            } else {
                // uncle is black, or nil
                if self[p].rb.children[dir] == Some(z) {
                    z = p;
                    self.rotate(z, dir ^ 1);
                    // z went down, its old child is the new parent
                    let Some(np) = self[z].rb.parent else {
                        break;
                    };
                    p = np;
                }
                self[p].rb.red = false;
                self[pp].rb.red = true;
                self.rotate(pp, dir);
            }
        }

        // blacken the root
        if let Some(root) = self.root {
            self[root].rb.red = false;
        }
    }

    /// Unlinks `z` and returns its item
    ///
    /// A node with two children is replaced by relinking its in-order
    /// successor into its position, so every other handle stays valid.
    pub fn delete(&mut self, z: Ref) -> T {
        let [zl, zr] = self[z].rb.children;
        let z_parent = self[z].rb.parent;
        let mut removed_red = self[z].rb.red;
        let x;
        let x_parent;

        match (zl, zr) {
            (None, _) => {
                x = zr;
                x_parent = z_parent;
                self.transplant(z, zr);
            }
            (Some(zl), None) => {
                x = Some(zl);
                x_parent = z_parent;
                self.transplant(z, Some(zl));
            }
            (Some(zl), Some(zr)) => {
                let y = self.edge(zr, LEFT);
                removed_red = self[y].rb.red;
                x = self[y].rb.children[RIGHT];
                if self[y].rb.parent == Some(z) {
                    x_parent = Some(y);
                } else {
                    x_parent = self[y].rb.parent;
                    self.transplant(y, x);
                    self[y].rb.children[RIGHT] = Some(zr);
                    self[zr].rb.parent = Some(y);
                }
                self.transplant(z, Some(y));
                self[y].rb.children[LEFT] = Some(zl);
                self[zl].rb.parent = Some(y);
                self[y].rb.red = self[z].rb.red;
            }
        }

        let removed = self.slab.remove(z.0);
        L::detached(self, x_parent);
        if !removed_red {
            self.fix_delete(x, x_parent);
        }
        removed.item
    }

    fn fix_delete(&mut self, mut x: Option<Ref>, mut parent: Option<Ref>) {
        while x != self.root && !self.is_red(x) {
            let Some(p) = parent else {
                break;
            };
            // the side of the sibling
            let dir = if self[p].rb.children[LEFT] == x {
                RIGHT
            } else {
                LEFT
            };
            // x carries an extra black, so its sibling exists
            let Some(mut w) = self[p].rb.children[dir] else {
                break;
            };
            if self[w].rb.red {
                self[w].rb.red = false;
                self[p].rb.red = true;
                self.rotate(p, dir ^ 1);

                // recompute w after the rotation of p
                let Some(nw) = self[p].rb.children[dir] else {
                    break;
                };
                w = nw;
            }
            let [wl, wr] = self[w].rb.children;
            if !self.is_red(wl) && !self.is_red(wr) {
                self[w].rb.red = true;
                x = Some(p);
                parent = self[p].rb.parent;
            } else {
                if !self.is_red(self[w].rb.children[dir]) {
                    // near nephew is the red one
                    if let Some(near) = self[w].rb.children[dir ^ 1] {
                        self[near].rb.red = false;
                    }
                    self[w].rb.red = true;
                    self.rotate(w, dir);
                    let Some(nw) = self[p].rb.children[dir] else {
                        break;
                    };
                    w = nw;
                }
                self[w].rb.red = self[p].rb.red;
                self[p].rb.red = false;
                if let Some(far) = self[w].rb.children[dir] {
                    self[far].rb.red = false;
                }
                self.rotate(p, dir ^ 1);
                x = self.root;
                parent = None;
            }
        }

        // blacken x
        if let Some(x) = x {
            self[x].rb.red = false;
        }
    }

    /// Deletes the in-order chain from `first` to `last`, both inclusive
    pub fn delete_range(&mut self, first: Ref, last: Ref) {
        let mut curr = Some(first);
        while let Some(node) = curr {
            curr = if node == last {
                None
            } else {
                self.next(node, RIGHT)
            };
            self.delete(node);
        }
    }

    /// Checks the red-black properties and the parent links
    ///
    /// - root property: root is black
    /// - red property: children of a red node are black
    /// - every path from a node to a nil leaf has the same number of black nodes
    pub fn is_valid(&self) -> bool {
        fn black_height<T, L>(rb: &RbSlab<T, L>, x: Option<Ref>, parent: Option<Ref>) -> Option<usize> {
            let Some(x) = x else {
                return Some(0);
            };
            let node = &rb[x];
            if node.rb.parent != parent {
                return None;
            }
            let [l, r] = node.rb.children;
            if node.rb.red && (rb.is_red(l) || rb.is_red(r)) {
                return None;
            }
            let left = black_height(rb, l, Some(x))?;
            let right = black_height(rb, r, Some(x))?;
            (left == right).then_some(left + usize::from(!node.rb.red))
        }

        !self.is_red(self.root) && black_height(self, self.root, None).is_some()
    }
}

/// Traversal orders for [RbSlab::walk]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Order {
    Pre,
    In,
    Post,
}

/// Stackless traversal over parent/child links
///
/// Created by [RbSlab::walk]; reverse walks run the mirrored order from
/// the other side.
pub struct Walk<'a, T, L> {
    tree: &'a RbSlab<T, L>,
    order: Order,
    first: usize,
    top: Option<Ref>,
    next: Option<Ref>,
}

impl<T, L> Walk<'_, T, L> {
    fn advance(&self, x: Ref) -> Option<Ref> {
        let tree = self.tree;
        let (first, second) = (self.first, self.first ^ 1);
        match self.order {
            Order::Pre => {
                let children = tree[x].rb.children;
                if let Some(child) = children[first].or(children[second]) {
                    return Some(child);
                }
                let mut x = x;
                while Some(x) != self.top {
                    let p = tree[x].rb.parent?;
                    if tree[p].rb.children[first] == Some(x) {
                        if let Some(sibling) = tree[p].rb.children[second] {
                            return Some(sibling);
                        }
                    }
                    x = p;
                }
                None
            }
            Order::In => {
                if let Some(child) = tree[x].rb.children[second] {
                    return Some(tree.edge(child, first));
                }
                let mut x = x;
                while Some(x) != self.top {
                    let p = tree[x].rb.parent?;
                    if tree[p].rb.children[first] == Some(x) {
                        return Some(p);
                    }
                    x = p;
                }
                None
            }
            Order::Post => {
                if Some(x) == self.top {
                    return None;
                }
                let p = tree[x].rb.parent?;
                match tree[p].rb.children[second] {
                    Some(sibling) if tree[p].rb.children[first] == Some(x) => {
                        Some(tree.deepest(sibling, first))
                    }
                    _ => Some(p),
                }
            }
        }
    }
}

impl<T, L> Iterator for Walk<'_, T, L> {
    type Item = Ref;

    fn next(&mut self) -> Option<Self::Item> {
        let curr = self.next?;
        self.next = self.advance(curr);
        Some(curr)
    }
}
