use crate::models::PropertyDetails;

/// Build the instruction sent to the search model for one property
pub fn build_prompt(details: &PropertyDetails, image_count: usize) -> String {
    let photos = match image_count {
        0 => String::new(),
        1 => "A photo of the property is attached; use it to confirm you found the right home.\n"
            .to_string(),
        n => format!(
            "{n} photos of the property (front and back) are attached; use them to confirm you found the right home.\n"
        ),
    };

    format!(
        "Find online videos of this property for sale.\n\
         \n\
         Property: {address}\n\
         MLS number: {mls}\n\
         {photos}\
         \n\
         Instructions:\n\
         1. First, give the link to the official listing page for this exact property \
         (brokerage site, Zillow, Realtor.com, Redfin, Trulia or Homes.com detail page).\n\
         2. Then list links to individual videos of this property: video tours, walkthroughs, \
         drone footage and 3D tours on YouTube, Vimeo, TikTok, Instagram, Facebook or Matterport.\n\
         3. Only include links that point at a single listing or a single video.\n\
         4. Do not include dead or removed links, channel or profile home pages, \
         or search-result and map pages.\n\
         5. Summarize briefly what you found and write each link as a full https URL.",
        address = details.display_address(),
        mls = details.mls_number.trim(),
    )
}
