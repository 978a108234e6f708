//! Seed an empty database with the launch catalog and an admin account.
//!
//! Refuses to run when any category already exists, so it is safe to call
//! from a deploy script.

use chirag_core::{CategoryId, Money, Slug, UserRole};
use chirag_storefront::db::categories::CategoryRepository;
use chirag_storefront::db::products::{NewProduct, ProductRepository};
use chirag_storefront::services::auth::AuthService;
use tracing::info;

use super::{admin_password, connect};

const ADMIN_NAME: &str = "Admin";
const ADMIN_EMAIL: &str = "admin@chirag.com";

struct SeedCategory {
    name: &'static str,
    description: &'static str,
    image: &'static str,
}

struct SeedProduct {
    name: &'static str,
    description: &'static str,
    price: &'static str,
    category: &'static str,
    images: &'static [&'static str],
    stock: i32,
    featured: bool,
    material: &'static str,
    weight: &'static str,
}

const CATEGORIES: &[SeedCategory] = &[
    SeedCategory {
        name: "Rings",
        description: "Exquisite rings for every occasion",
        image: "/images/product/1.jpg",
    },
    SeedCategory {
        name: "Necklaces",
        description: "Elegant necklaces that make a statement",
        image: "/images/product/5.jpg",
    },
    SeedCategory {
        name: "Earrings",
        description: "Beautiful earrings to complement your style",
        image: "/images/product/10.jpg",
    },
    SeedCategory {
        name: "Bracelets",
        description: "Stunning bracelets for a touch of elegance",
        image: "/images/product/15.jpg",
    },
    SeedCategory {
        name: "Bangles",
        description: "Traditional and modern bangles collection",
        image: "/images/product/20.jpg",
    },
    SeedCategory {
        name: "Pendants",
        description: "Charming pendants for everyday wear",
        image: "/images/product/25.jpg",
    },
    SeedCategory {
        name: "Chains",
        description: "Fine chains crafted with precision",
        image: "/images/product/30.jpg",
    },
    SeedCategory {
        name: "Anklets",
        description: "Delicate anklets for a graceful look",
        image: "/images/product/35.jpg",
    },
];

const PRODUCTS: &[SeedProduct] = &[
    SeedProduct {
        name: "Classic Gold Solitaire Ring",
        description: "A timeless gold solitaire ring featuring a brilliant cut stone set in 18K gold. Perfect for engagements or special occasions.",
        price: "15999",
        category: "Rings",
        images: &["/images/product/1.jpg", "/images/product/2.jpg"],
        stock: 25,
        featured: true,
        material: "Gold",
        weight: "4.5g",
    },
    SeedProduct {
        name: "Diamond Studded Band",
        description: "An elegant band encrusted with premium diamonds, crafted in white gold for a luxurious modern look.",
        price: "28999",
        category: "Rings",
        images: &["/images/product/3.jpg", "/images/product/4.jpg"],
        stock: 15,
        featured: true,
        material: "Diamond",
        weight: "3.8g",
    },
    SeedProduct {
        name: "Rose Gold Infinity Ring",
        description: "A delicate infinity ring in rose gold with micro-pave diamonds symbolizing eternal love.",
        price: "12499",
        category: "Rings",
        images: &["/images/product/5.jpg", "/images/product/6.jpg"],
        stock: 30,
        featured: false,
        material: "Rose Gold",
        weight: "3.2g",
    },
    SeedProduct {
        name: "Platinum Promise Ring",
        description: "A sleek platinum ring with a minimalist design, perfect as a promise ring or everyday wear.",
        price: "22999",
        category: "Rings",
        images: &["/images/product/7.jpg"],
        stock: 10,
        featured: false,
        material: "Platinum",
        weight: "5.0g",
    },
    SeedProduct {
        name: "Pearl Drop Necklace",
        description: "An exquisite pearl drop necklace with a sterling silver chain, ideal for formal and festive occasions.",
        price: "8999",
        category: "Necklaces",
        images: &["/images/product/8.jpg", "/images/product/9.jpg"],
        stock: 20,
        featured: true,
        material: "Silver",
        weight: "12g",
    },
    SeedProduct {
        name: "Gold Layered Chain Necklace",
        description: "A trendy multi-layered gold chain necklace that adds sophistication to any outfit.",
        price: "18999",
        category: "Necklaces",
        images: &["/images/product/10.jpg", "/images/product/11.jpg"],
        stock: 18,
        featured: true,
        material: "Gold",
        weight: "15g",
    },
    SeedProduct {
        name: "Diamond Pendant Necklace",
        description: "A stunning diamond pendant on a fine gold chain, perfect for an elegant evening look.",
        price: "35999",
        category: "Necklaces",
        images: &["/images/product/12.jpg", "/images/product/13.jpg"],
        stock: 8,
        featured: false,
        material: "Diamond",
        weight: "8g",
    },
    SeedProduct {
        name: "Choker Style Statement Necklace",
        description: "A bold choker necklace with intricate goldwork, designed for those who love to make a statement.",
        price: "14999",
        category: "Necklaces",
        images: &["/images/product/14.jpg"],
        stock: 22,
        featured: false,
        material: "Gold",
        weight: "20g",
    },
    SeedProduct {
        name: "Diamond Stud Earrings",
        description: "Classic diamond stud earrings set in 18K white gold, a must-have in every jewellery collection.",
        price: "24999",
        category: "Earrings",
        images: &["/images/product/15.jpg", "/images/product/16.jpg"],
        stock: 35,
        featured: true,
        material: "Diamond",
        weight: "2.5g",
    },
    SeedProduct {
        name: "Gold Jhumka Earrings",
        description: "Traditional gold jhumka earrings with intricate filigree work, perfect for festive and bridal wear.",
        price: "16999",
        category: "Earrings",
        images: &["/images/product/17.jpg", "/images/product/18.jpg"],
        stock: 28,
        featured: true,
        material: "Gold",
        weight: "8g",
    },
    SeedProduct {
        name: "Silver Hoop Earrings",
        description: "Modern sterling silver hoop earrings with a polished finish for everyday elegance.",
        price: "4999",
        category: "Earrings",
        images: &["/images/product/19.jpg", "/images/product/20.jpg"],
        stock: 50,
        featured: false,
        material: "Silver",
        weight: "5g",
    },
    SeedProduct {
        name: "Rose Gold Drop Earrings",
        description: "Elegant rose gold drop earrings with gemstone accents for a feminine and romantic look.",
        price: "11999",
        category: "Earrings",
        images: &["/images/product/21.jpg"],
        stock: 20,
        featured: false,
        material: "Rose Gold",
        weight: "4g",
    },
    SeedProduct {
        name: "Gold Chain Bracelet",
        description: "A refined gold chain bracelet with a secure clasp, perfect for layering or wearing alone.",
        price: "13999",
        category: "Bracelets",
        images: &["/images/product/22.jpg", "/images/product/23.jpg"],
        stock: 25,
        featured: true,
        material: "Gold",
        weight: "10g",
    },
    SeedProduct {
        name: "Diamond Tennis Bracelet",
        description: "A luxurious diamond tennis bracelet featuring a continuous line of brilliant-cut diamonds.",
        price: "45999",
        category: "Bracelets",
        images: &["/images/product/24.jpg", "/images/product/25.jpg"],
        stock: 5,
        featured: true,
        material: "Diamond",
        weight: "14g",
    },
    SeedProduct {
        name: "Silver Cuff Bracelet",
        description: "A bold sterling silver cuff bracelet with an adjustable fit and hammered texture.",
        price: "6999",
        category: "Bracelets",
        images: &["/images/product/26.jpg"],
        stock: 30,
        featured: false,
        material: "Silver",
        weight: "18g",
    },
    SeedProduct {
        name: "Charm Bracelet Collection",
        description: "A customizable charm bracelet in rose gold with various themed charms included.",
        price: "9499",
        category: "Bracelets",
        images: &["/images/product/27.jpg", "/images/product/28.jpg"],
        stock: 40,
        featured: false,
        material: "Rose Gold",
        weight: "8g",
    },
    SeedProduct {
        name: "Traditional Gold Bangles Set",
        description: "A set of four traditional gold bangles with intricate engravings, perfect for weddings and festivals.",
        price: "32999",
        category: "Bangles",
        images: &["/images/product/29.jpg", "/images/product/30.jpg"],
        stock: 12,
        featured: true,
        material: "Gold",
        weight: "40g",
    },
    SeedProduct {
        name: "Diamond Accent Bangle",
        description: "A sleek bangle with diamond accents along the edge for subtle sparkle.",
        price: "19999",
        category: "Bangles",
        images: &["/images/product/31.jpg", "/images/product/32.jpg"],
        stock: 15,
        featured: false,
        material: "Diamond",
        weight: "15g",
    },
    SeedProduct {
        name: "Silver Kada Bangle",
        description: "A sturdy silver kada bangle with traditional motifs, a classic piece for men and women.",
        price: "7999",
        category: "Bangles",
        images: &["/images/product/33.jpg"],
        stock: 35,
        featured: false,
        material: "Silver",
        weight: "25g",
    },
    SeedProduct {
        name: "Platinum Sleek Bangle",
        description: "A modern platinum bangle with a minimalist polished design for contemporary style.",
        price: "27999",
        category: "Bangles",
        images: &["/images/product/34.jpg"],
        stock: 8,
        featured: false,
        material: "Platinum",
        weight: "18g",
    },
    SeedProduct {
        name: "Heart Shaped Gold Pendant",
        description: "A romantic heart-shaped pendant in 22K gold, a timeless gift for your loved one.",
        price: "11999",
        category: "Pendants",
        images: &["/images/product/35.jpg", "/images/product/36.jpg"],
        stock: 30,
        featured: true,
        material: "Gold",
        weight: "3g",
    },
    SeedProduct {
        name: "Diamond Solitaire Pendant",
        description: "A stunning solitaire diamond pendant that catches light from every angle.",
        price: "29999",
        category: "Pendants",
        images: &["/images/product/37.jpg", "/images/product/38.jpg"],
        stock: 10,
        featured: true,
        material: "Diamond",
        weight: "2.8g",
    },
    SeedProduct {
        name: "Silver Om Pendant",
        description: "A spiritual silver Om pendant with fine detailing, perfect for daily wear.",
        price: "3499",
        category: "Pendants",
        images: &["/images/product/39.jpg"],
        stock: 45,
        featured: false,
        material: "Silver",
        weight: "4g",
    },
    SeedProduct {
        name: "Rose Gold Floral Pendant",
        description: "A delicate floral pendant in rose gold with tiny diamond accents in the petals.",
        price: "14999",
        category: "Pendants",
        images: &["/images/product/40.jpg"],
        stock: 22,
        featured: false,
        material: "Rose Gold",
        weight: "3.5g",
    },
    SeedProduct {
        name: "22K Gold Rope Chain",
        description: "A classic 22K gold rope chain with a sturdy clasp, available in multiple lengths.",
        price: "24999",
        category: "Chains",
        images: &["/images/product/41.jpg", "/images/product/42.jpg"],
        stock: 20,
        featured: true,
        material: "Gold",
        weight: "12g",
    },
    SeedProduct {
        name: "Silver Box Chain",
        description: "A sleek sterling silver box chain with a modern geometric design.",
        price: "3999",
        category: "Chains",
        images: &["/images/product/43.jpg", "/images/product/44.jpg"],
        stock: 40,
        featured: false,
        material: "Silver",
        weight: "8g",
    },
    SeedProduct {
        name: "Platinum Curb Chain",
        description: "A premium platinum curb chain with a heavy, luxurious feel.",
        price: "38999",
        category: "Chains",
        images: &["/images/product/45.jpg"],
        stock: 6,
        featured: false,
        material: "Platinum",
        weight: "20g",
    },
    SeedProduct {
        name: "Rose Gold Figaro Chain",
        description: "An elegant rose gold figaro chain with alternating link patterns.",
        price: "15999",
        category: "Chains",
        images: &["/images/product/46.jpg"],
        stock: 18,
        featured: false,
        material: "Rose Gold",
        weight: "10g",
    },
    SeedProduct {
        name: "Silver Payal Anklet Set",
        description: "A traditional silver payal anklet set with tinkling bells, a symbol of Indian elegance.",
        price: "5999",
        category: "Anklets",
        images: &["/images/product/47.jpg", "/images/product/48.jpg"],
        stock: 35,
        featured: true,
        material: "Silver",
        weight: "15g",
    },
    SeedProduct {
        name: "Gold Charm Anklet",
        description: "A delicate gold anklet with small charms, perfect for beach wear and summer style.",
        price: "9999",
        category: "Anklets",
        images: &["/images/product/49.jpg", "/images/product/50.jpg"],
        stock: 25,
        featured: false,
        material: "Gold",
        weight: "6g",
    },
    SeedProduct {
        name: "Diamond Studded Anklet",
        description: "A luxurious anklet with diamond studs set in white gold for a glamorous look.",
        price: "18999",
        category: "Anklets",
        images: &["/images/product/70.jpg", "/images/product/71.jpg"],
        stock: 10,
        featured: false,
        material: "Diamond",
        weight: "8g",
    },
    SeedProduct {
        name: "Rose Gold Minimalist Anklet",
        description: "A simple yet elegant rose gold anklet with a single gem accent.",
        price: "7499",
        category: "Anklets",
        images: &["/images/product/72.jpg"],
        stock: 30,
        featured: false,
        material: "Rose Gold",
        weight: "4g",
    },
];

/// Insert the admin account, categories and products.
///
/// # Errors
///
/// Returns an error if `CHIRAG_ADMIN_PASSWORD` is missing, the database is
/// unreachable, or any insert fails.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let password = admin_password()?;
    let pool = connect().await?;

    let categories = CategoryRepository::new(&pool);
    if !categories.list().await?.is_empty() {
        info!("Catalog already has categories; skipping seed");
        return Ok(());
    }

    info!("Seeding database...");

    AuthService::new(&pool)
        .create_user(ADMIN_NAME, ADMIN_EMAIL, &password, &password, UserRole::Admin)
        .await?;
    info!(email = ADMIN_EMAIL, "Admin user created");

    let mut category_ids: Vec<(&str, CategoryId)> = Vec::with_capacity(CATEGORIES.len());
    for category in CATEGORIES {
        let created = categories
            .create(
                category.name,
                &Slug::from_name(category.name)?,
                Some(category.description),
                Some(category.image),
            )
            .await?;
        category_ids.push((category.name, created.id));
    }
    info!(count = category_ids.len(), "Categories created");

    let products = ProductRepository::new(&pool);
    for product in PRODUCTS {
        let category_id = category_ids
            .iter()
            .find(|(name, _)| *name == product.category)
            .map(|(_, id)| *id)
            .ok_or_else(|| format!("Unknown seed category: {}", product.category))?;

        products
            .create(&NewProduct {
                name: product.name.to_owned(),
                slug: Slug::from_name(product.name)?,
                description: Some(product.description.to_owned()),
                price: Money::parse(product.price)?,
                compare_at_price: None,
                images: product.images.iter().map(|&i| i.to_owned()).collect(),
                category_id,
                stock: product.stock,
                is_featured: product.featured,
                is_active: true,
                material: Some(product.material.to_owned()),
                weight: Some(product.weight.to_owned()),
            })
            .await?;
    }
    info!(count = PRODUCTS.len(), "Products created");

    info!("Seeding complete!");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_every_product_has_a_known_category() {
        for product in PRODUCTS {
            assert!(
                CATEGORIES.iter().any(|c| c.name == product.category),
                "{} has unknown category {}",
                product.name,
                product.category
            );
        }
    }

    #[test]
    fn test_seed_values_parse() {
        for product in PRODUCTS {
            assert!(!Money::parse(product.price).unwrap().is_zero());
            Slug::from_name(product.name).unwrap();
            assert!(!product.images.is_empty());
        }
        for category in CATEGORIES {
            Slug::from_name(category.name).unwrap();
        }
    }

    #[test]
    fn test_slugs_are_unique() {
        let mut slugs: Vec<String> = PRODUCTS
            .iter()
            .map(|p| Slug::from_name(p.name).unwrap().into_inner())
            .collect();
        slugs.sort();
        slugs.dedup();
        assert_eq!(slugs.len(), PRODUCTS.len());
    }
}
